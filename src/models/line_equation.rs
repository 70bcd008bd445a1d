/// Least-squares line fitted through staff-line pixels
use super::Point;

/// Fitted line `y = slope * x + intercept`, or a vertical line when every
/// point shares one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineEquation {
    /// Regular line
    Sloped {
        /// dy/dx
        slope: f64,
        /// y at x = 0
        intercept: f64,
    },
    /// All points in column `x`; `mean_y` stands in for the line's height
    Vertical {
        /// Shared column
        x: f64,
        /// Mean row of the fitted points
        mean_y: f64,
    },
}

impl LineEquation {
    /// Line through two points
    pub fn through(a: Point, b: Point) -> Self {
        if a.x == b.x {
            return LineEquation::Vertical {
                x: a.x as f64,
                mean_y: (a.y + b.y) as f64 / 2.0,
            };
        }
        let slope = (b.y - a.y) as f64 / (b.x - a.x) as f64;
        LineEquation::Sloped {
            slope,
            intercept: a.y as f64 - slope * a.x as f64,
        }
    }

    /// Ordinary least-squares fit of y on x; `None` for an empty point set
    pub fn fit<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
        I::IntoIter: Clone,
    {
        let iter = points.into_iter();
        let mut n = 0usize;
        let mut sum_x = 0.0f64;
        let mut sum_y = 0.0f64;
        for p in iter.clone() {
            n += 1;
            sum_x += p.x as f64;
            sum_y += p.y as f64;
        }
        if n == 0 {
            return None;
        }
        let mean_x = sum_x / n as f64;
        let mean_y = sum_y / n as f64;

        // Centered sums keep precision on wide pages
        let mut sxx = 0.0f64;
        let mut sxy = 0.0f64;
        for p in iter {
            let dx = p.x as f64 - mean_x;
            sxx += dx * dx;
            sxy += dx * (p.y as f64 - mean_y);
        }

        if sxx == 0.0 {
            return Some(LineEquation::Vertical { x: mean_x, mean_y });
        }
        let slope = sxy / sxx;
        Some(LineEquation::Sloped {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    /// Row of the line at column `x`
    pub fn y_at(&self, x: f64) -> f64 {
        match *self {
            LineEquation::Sloped { slope, intercept } => slope * x + intercept,
            LineEquation::Vertical { mean_y, .. } => mean_y,
        }
    }

    /// Column of the line at row `y`; `None` for a horizontal line
    pub fn x_at(&self, y: f64) -> Option<f64> {
        match *self {
            LineEquation::Sloped { slope, intercept } => {
                if slope == 0.0 {
                    None
                } else {
                    Some((y - intercept) / slope)
                }
            }
            LineEquation::Vertical { x, .. } => Some(x),
        }
    }

    /// Slope, or `None` for a vertical line
    pub fn slope(&self) -> Option<f64> {
        match *self {
            LineEquation::Sloped { slope, .. } => Some(slope),
            LineEquation::Vertical { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_horizontal_band() {
        let points: Vec<Point> = (0..20)
            .flat_map(|x| [Point::new(x, 10), Point::new(x, 11)])
            .collect();
        let eq = LineEquation::fit(&points).unwrap();
        assert!((eq.y_at(0.0) - 10.5).abs() < 1e-9);
        assert!((eq.y_at(19.0) - 10.5).abs() < 1e-9);
        assert_eq!(eq.slope(), Some(0.0));
        assert_eq!(eq.x_at(10.5), None);
    }

    #[test]
    fn test_fit_skewed_line() {
        let points: Vec<Point> = (0..10).map(|x| Point::new(x, 2 * x + 3)).collect();
        let eq = LineEquation::fit(&points).unwrap();
        assert!((eq.y_at(4.0) - 11.0).abs() < 1e-9);
        assert!((eq.x_at(11.0).unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_column_is_vertical() {
        let points = [Point::new(5, 1), Point::new(5, 2), Point::new(5, 6)];
        let eq = LineEquation::fit(&points).unwrap();
        assert_eq!(eq, LineEquation::Vertical { x: 5.0, mean_y: 3.0 });
        assert_eq!(eq.x_at(100.0), Some(5.0));
        assert!((eq.y_at(42.0) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_point_is_vertical() {
        let eq = LineEquation::fit(&[Point::new(3, 4)]).unwrap();
        assert!(eq.slope().is_none());
    }

    #[test]
    fn test_empty_has_no_fit() {
        let points: Vec<Point> = Vec::new();
        assert!(LineEquation::fit(&points).is_none());
    }

    #[test]
    fn test_through() {
        let eq = LineEquation::through(Point::new(0, 0), Point::new(4, 2));
        assert!((eq.y_at(2.0) - 1.0).abs() < 1e-9);
        let vertical = LineEquation::through(Point::new(1, 0), Point::new(1, 8));
        assert!(vertical.slope().is_none());
    }
}
