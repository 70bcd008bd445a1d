use crate::models::{BinaryRaster, Staff};

/// Draw the fitted lines of every staff onto a blank page
///
/// Each line covers `thickness` rows centred on its fit. Pixels falling
/// outside the page are dropped.
pub fn render_staffs(
    staffs: &[Staff],
    width: usize,
    height: usize,
    thickness: i32,
) -> BinaryRaster {
    let mut raster = BinaryRaster::new(width, height);
    for staff in staffs {
        staff.render_into(&mut raster, thickness);
    }
    raster
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Point, StaffLine};

    fn staff(top: i32) -> Staff {
        Staff::new(std::array::from_fn(|i| {
            let y = top + 10 * i as i32;
            StaffLine::from_points((0..30).map(|x| Point::new(x, y)))
        }))
    }

    #[test]
    fn test_render_thin_lines() {
        let raster = render_staffs(&[staff(5)], 30, 60, 1);
        assert_eq!(raster.count_foreground(), 150);
        assert!(raster.get(0, 5) && raster.get(29, 45));
        assert!(!raster.get(0, 6));
    }

    #[test]
    fn test_render_thickness_and_clipping() {
        // Line 0 sits on row 0, so its upper row falls off the page
        let raster = render_staffs(&[staff(0)], 30, 41, 3);
        assert!(raster.get(3, 1));
        assert!(raster.get(3, 9) && raster.get(3, 11));
        assert_eq!(raster.count_foreground(), 30 * (2 + 3 * 3 + 2));
    }

    #[test]
    fn test_render_nothing() {
        assert_eq!(render_staffs(&[], 10, 10, 2).count_foreground(), 0);
    }
}
