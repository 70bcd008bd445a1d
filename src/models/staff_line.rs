use std::cell::OnceCell;
use std::collections::BTreeSet;

use super::{BinaryRaster, LineEquation, Point};

/// Values derived from a staff line's point set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSummary {
    /// Leftmost column
    pub left_x: i32,
    /// Rightmost column
    pub right_x: i32,
    /// Topmost row in the leftmost column
    pub left_top_y: i32,
    /// Bottommost row in the leftmost column
    pub left_bottom_y: i32,
    /// Topmost row in the rightmost column
    pub right_top_y: i32,
    /// Bottommost row in the rightmost column
    pub right_bottom_y: i32,
    /// Topmost row anywhere on the line
    pub min_y: i32,
    /// Bottommost row anywhere on the line
    pub max_y: i32,
    /// Number of distinct columns
    pub horizontal_coverage: i32,
    /// Least-squares fit through every point
    pub equation: Option<LineEquation>,
}

impl LineSummary {
    fn compute(points: &BTreeSet<Point>) -> Self {
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Self {
                left_x: 0,
                right_x: 0,
                left_top_y: 0,
                left_bottom_y: 0,
                right_top_y: 0,
                right_bottom_y: 0,
                min_y: 0,
                max_y: 0,
                horizontal_coverage: 0,
                equation: None,
            };
        };

        // Points are ordered by x then y, so each column is contiguous and
        // its first and last entries are its top and bottom
        let left_bottom_y = points
            .range(..Point::new(first.x + 1, i32::MIN))
            .next_back()
            .map_or(first.y, |p| p.y);
        let right_top_y = points
            .range(Point::new(last.x, i32::MIN)..)
            .next()
            .map_or(last.y, |p| p.y);

        let mut min_y = i32::MAX;
        let mut max_y = i32::MIN;
        let mut coverage = 0;
        let mut previous_x = None;
        for p in points {
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
            if previous_x != Some(p.x) {
                coverage += 1;
                previous_x = Some(p.x);
            }
        }

        Self {
            left_x: first.x,
            right_x: last.x,
            left_top_y: first.y,
            left_bottom_y,
            right_top_y,
            right_bottom_y: last.y,
            min_y,
            max_y,
            horizontal_coverage: coverage,
            equation: LineEquation::fit(points),
        }
    }
}

/// One of the five strokes of a staff, accumulated pixel by pixel
///
/// Derived values are cached and dropped on every mutation, so a read never
/// sees a stale summary.
#[derive(Debug, Clone, Default)]
pub struct StaffLine {
    points: BTreeSet<Point>,
    summary: OnceCell<LineSummary>,
}

impl PartialEq for StaffLine {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl StaffLine {
    /// Empty line
    pub fn new() -> Self {
        Self::default()
    }

    /// Line holding `points`
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Self {
        Self {
            points: points.into_iter().collect(),
            summary: OnceCell::new(),
        }
    }

    /// Vertical run `y_start..y_start + len` in column `x`
    pub fn from_run(x: i32, y_start: i32, len: i32) -> Self {
        Self::from_points((y_start..y_start + len).map(|y| Point::new(x, y)))
    }

    /// Insert one point
    pub fn add_point(&mut self, point: Point) {
        if self.points.insert(point) {
            self.summary.take();
        }
    }

    /// Union every point of `other` into this line
    pub fn add_staff_line(&mut self, other: &StaffLine) {
        let before = self.points.len();
        self.points.extend(other.points.iter().copied());
        if self.points.len() != before {
            self.summary.take();
        }
    }

    /// Union a batch of points
    pub fn extend<I: IntoIterator<Item = Point>>(&mut self, points: I) {
        self.points.extend(points);
        self.summary.take();
    }

    /// Shift every point by `dy` rows
    pub fn translate_vertically(&mut self, dy: i32) {
        if dy == 0 {
            return;
        }
        self.points = self.points.iter().map(|p| p.translate(0, dy)).collect();
        self.summary.take();
    }

    /// Exact membership test
    pub fn contains_point(&self, point: Point) -> bool {
        self.points.contains(&point)
    }

    /// Geometric test: is `(x, y)` within `margin` rows of the fitted line
    pub fn contains(&self, x: f64, y: f64, margin: f64) -> bool {
        match self.line_equation() {
            Some(eq) => (y - eq.y_at(x)).abs() <= margin,
            None => false,
        }
    }

    /// Ordered point set
    pub fn points(&self) -> &BTreeSet<Point> {
        &self.points
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the line holds no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Cached derived values
    pub fn summary(&self) -> &LineSummary {
        self.summary.get_or_init(|| LineSummary::compute(&self.points))
    }

    /// Fitted line, `None` while empty
    pub fn line_equation(&self) -> Option<LineEquation> {
        self.summary().equation
    }

    /// Row of the fitted line at column `x`
    pub fn center_y_at(&self, x: f64) -> Option<f64> {
        self.line_equation().map(|eq| eq.y_at(x))
    }

    /// Leftmost column
    pub fn left_edge_x(&self) -> i32 {
        self.summary().left_x
    }

    /// Rightmost column
    pub fn right_edge_x(&self) -> i32 {
        self.summary().right_x
    }

    /// Top row of the leftmost column
    pub fn left_edge_top_y(&self) -> i32 {
        self.summary().left_top_y
    }

    /// Bottom row of the leftmost column
    pub fn left_edge_bottom_y(&self) -> i32 {
        self.summary().left_bottom_y
    }

    /// Top row of the rightmost column
    pub fn right_edge_top_y(&self) -> i32 {
        self.summary().right_top_y
    }

    /// Bottom row of the rightmost column
    pub fn right_edge_bottom_y(&self) -> i32 {
        self.summary().right_bottom_y
    }

    /// Topmost row
    pub fn min_y(&self) -> i32 {
        self.summary().min_y
    }

    /// Bottommost row
    pub fn max_y(&self) -> i32 {
        self.summary().max_y
    }

    /// Number of distinct columns the line touches
    pub fn horizontal_coverage(&self) -> i32 {
        self.summary().horizontal_coverage
    }

    /// Draw the fitted line from edge to edge, `thickness` rows per column
    ///
    /// The rows are centred on the fit, so a line of the modal thickness
    /// redraws exactly its own ink. Falls back to the raw points when the
    /// line has no usable fit.
    pub fn render_into(&self, raster: &mut BinaryRaster, thickness: i32) {
        let Some(eq) = self.line_equation() else {
            return;
        };
        if eq.slope().is_none() {
            for p in &self.points {
                raster.set_signed(p.x, p.y, true);
            }
            return;
        }
        let thickness = thickness.max(1);
        let half_span = (thickness - 1) as f64 / 2.0;
        for x in self.left_edge_x()..=self.right_edge_x() {
            let top = (eq.y_at(x as f64) - half_span).round() as i32;
            for y in top..top + thickness {
                raster.set_signed(x, y, true);
            }
        }
    }
}
