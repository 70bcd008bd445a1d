/// Staff-line subtraction that keeps symbols crossing the lines
use crate::models::BinaryRaster;

/// Erase from `page` every pixel covered by `lines`, unless a symbol continues
/// through the line band
///
/// For a covered pixel the band of `lines` is followed down to its first
/// uncovered row; if `page` has ink there the pixel is kept. Otherwise the same
/// check runs upward. With `eight_way` the diagonal neighbours of that row
/// also count, so slanted stems and beams survive.
pub fn remove_lines(page: &BinaryRaster, lines: &BinaryRaster, eight_way: bool) -> BinaryRaster {
    let width = page.width();
    let height = page.height();
    let mut result = page.clone();

    for y in 0..height {
        for x in 0..width {
            if !page.get(x, y) || !lines.get(x, y) {
                continue;
            }

            let below = band_edge(lines, x, y, Direction::Down);
            let keep = below.is_some_and(|row| has_ink(page, x, row, eight_way && row != y))
                || band_edge(lines, x, y, Direction::Up)
                    .is_some_and(|row| has_ink(page, x, row, eight_way && row != y));

            if !keep {
                result.set(x, y, false);
            }
        }
    }

    result
}

#[derive(Clone, Copy)]
enum Direction {
    Up,
    Down,
}

/// First row past the covered band starting at `(x, y)`, or `None` at the page edge
fn band_edge(lines: &BinaryRaster, x: usize, y: usize, direction: Direction) -> Option<usize> {
    let mut row = y;
    while lines.get(x, row) {
        row = match direction {
            Direction::Down => {
                if row + 1 >= lines.height() {
                    return None;
                }
                row + 1
            }
            Direction::Up => row.checked_sub(1)?,
        };
    }
    Some(row)
}

fn has_ink(page: &BinaryRaster, x: usize, row: usize, diagonals: bool) -> bool {
    if page.get(x, row) {
        return true;
    }
    diagonals && ((x > 0 && page.get(x - 1, row)) || page.get(x + 1, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_line() -> (BinaryRaster, BinaryRaster) {
        let mut page = BinaryRaster::new(20, 10);
        let mut lines = BinaryRaster::new(20, 10);
        for x in 0..20 {
            for y in [4, 5] {
                page.set(x, y, true);
                lines.set(x, y, true);
            }
        }
        (page, lines)
    }

    #[test]
    fn test_plain_line_is_erased() {
        let (page, lines) = page_with_line();
        let cleaned = remove_lines(&page, &lines, false);
        assert_eq!(cleaned.count_foreground(), 0);
    }

    #[test]
    fn test_vertical_stroke_survives() {
        let (mut page, lines) = page_with_line();
        for y in 0..10 {
            page.set(7, y, true);
        }
        let cleaned = remove_lines(&page, &lines, false);
        assert!(cleaned.get(7, 4) && cleaned.get(7, 5));
        assert!(!cleaned.get(6, 4));
        assert_eq!(cleaned.count_foreground(), 10);
    }

    #[test]
    fn test_diagonal_neighbour_needs_eight_way() {
        let (mut page, lines) = page_with_line();
        page.set(8, 6, true);
        assert!(!remove_lines(&page, &lines, false).get(7, 5));
        let cleaned = remove_lines(&page, &lines, true);
        assert!(cleaned.get(7, 5));
        assert!(cleaned.get(9, 4));
    }

    #[test]
    fn test_non_line_ink_untouched() {
        let (mut page, lines) = page_with_line();
        page.set(3, 8, true);
        let cleaned = remove_lines(&page, &lines, true);
        assert!(cleaned.get(3, 8));
    }
}
