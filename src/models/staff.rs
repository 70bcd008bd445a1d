use std::cmp::Ordering;

use super::pitch::{LedgerSide, Pitch, TREBLE_STAFF, ledger_pitch};
use super::{BinaryRaster, Point, StaffLine};
use crate::detector::tolerance::Tolerances;
use crate::error::{OmrError, Result};

/// Number of lines in a staff
pub const STAFF_LINES: usize = 5;

/// Bounding box and coverage of a staff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StaffBounds {
    /// Leftmost column of any line
    pub left: i32,
    /// Rightmost column of any line
    pub right: i32,
    /// Top of the top line at its edges
    pub top: i32,
    /// Bottom of the bottom line at its edges
    pub bottom: i32,
    /// Smallest coverage among the five lines
    pub horizontal_coverage: i32,
}

/// Five staff lines, index 0 the topmost
#[derive(Debug, Clone, PartialEq)]
pub struct Staff {
    lines: [StaffLine; STAFF_LINES],
    bounds: StaffBounds,
}

impl Staff {
    /// Build a staff from its lines, top to bottom
    pub fn new(lines: [StaffLine; STAFF_LINES]) -> Self {
        let mut staff = Self {
            lines,
            bounds: StaffBounds::default(),
        };
        staff.update_bounds();
        staff
    }

    fn update_bounds(&mut self) {
        let mut left = i32::MAX;
        let mut right = i32::MIN;
        let mut coverage = i32::MAX;
        for line in &self.lines {
            left = left.min(line.left_edge_x());
            right = right.max(line.right_edge_x());
            coverage = coverage.min(line.horizontal_coverage());
        }
        let first = &self.lines[0];
        let last = &self.lines[STAFF_LINES - 1];
        self.bounds = StaffBounds {
            left,
            right,
            top: first.left_edge_top_y().min(first.right_edge_top_y()),
            bottom: last.left_edge_bottom_y().max(last.right_edge_bottom_y()),
            horizontal_coverage: coverage,
        };
    }

    /// Merge `other` line by line: line `i` only ever joins line `i`
    pub fn add_staff(&mut self, other: &Staff) {
        for (mine, theirs) in self.lines.iter_mut().zip(other.lines.iter()) {
            mine.add_staff_line(theirs);
        }
        self.update_bounds();
    }

    /// Union `points` into line `index`
    pub fn extend_line<I: IntoIterator<Item = Point>>(&mut self, index: usize, points: I) {
        self.lines[index].extend(points);
        self.update_bounds();
    }

    /// Shift every line by `dy` rows
    pub fn translate_vertically(&mut self, dy: i32) {
        for line in self.lines.iter_mut() {
            line.translate_vertically(dy);
        }
        self.update_bounds();
    }

    /// Lines, top to bottom
    pub fn lines(&self) -> &[StaffLine; STAFF_LINES] {
        &self.lines
    }

    /// Line `index`, 0 = top
    pub fn line(&self, index: usize) -> &StaffLine {
        &self.lines[index]
    }

    /// Current bounds
    pub fn bounds(&self) -> StaffBounds {
        self.bounds
    }

    /// Top row
    pub fn top_bound(&self) -> i32 {
        self.bounds.top
    }

    /// Bottom row
    pub fn bottom_bound(&self) -> i32 {
        self.bounds.bottom
    }

    /// Leftmost column
    pub fn left_bound(&self) -> i32 {
        self.bounds.left
    }

    /// Rightmost column
    pub fn right_bound(&self) -> i32 {
        self.bounds.right
    }

    /// Smallest horizontal coverage of the five lines
    pub fn horizontal_coverage(&self) -> i32 {
        self.bounds.horizontal_coverage
    }

    /// Rows from the top of the first line to the bottom of the last
    pub fn height(&self) -> i32 {
        self.bounds.bottom - self.bounds.top + 1
    }

    /// Index of the line owning `point`
    ///
    /// The bounding box, grown by the line margin, is checked first. Exact
    /// membership wins; otherwise the first line whose fit passes within the
    /// margin of the point is taken.
    pub fn line_containing(&self, point: Point, tol: &Tolerances) -> Option<usize> {
        let m = tol.line_margin;
        let b = &self.bounds;
        if point.x < b.left - m || point.x > b.right + m {
            return None;
        }
        if point.y < b.top - m || point.y > b.bottom + m {
            return None;
        }
        if let Some(index) = self.lines.iter().position(|l| l.contains_point(point)) {
            return Some(index);
        }
        self.lines
            .iter()
            .position(|l| l.contains(point.x as f64, point.y as f64, m as f64))
    }

    /// Geometric containment against line `line_index`
    pub fn contains(&self, x: f64, y: f64, tol: &Tolerances, line_index: usize) -> bool {
        self.lines[line_index].contains(x, y, tol.line_margin as f64)
    }

    /// Fitted centre rows of the five lines at column `x`
    pub fn line_centers(&self, x: f64) -> Result<[f64; STAFF_LINES]> {
        let mut centers = [0.0; STAFF_LINES];
        for (index, line) in self.lines.iter().enumerate() {
            centers[index] = line
                .center_y_at(x)
                .ok_or(OmrError::EmptyStaffLine { index })?;
        }
        Ok(centers)
    }

    /// Treble-clef pitch of a note head centred at `(x, y)`
    pub fn pitch_treble(&self, x: f64, y: f64, tol: &Tolerances) -> Result<Pitch> {
        if !x.is_finite() || !y.is_finite() {
            return Err(OmrError::NonFinitePosition { x, y });
        }
        let margin = tol.pitch_margin();
        let step = tol.line_center_distance();
        let centers = self.line_centers(x)?;
        let top = self.bounds.top as f64;
        let bottom = self.bounds.bottom as f64;

        if y >= top && y <= bottom {
            let [c1, c2, c3, c4, c5] = centers;
            let index = if y <= c1 + margin {
                0
            } else if y < c2 - margin {
                1
            } else if y <= c2 + margin {
                2
            } else if y < c3 - margin {
                3
            } else if y <= c3 + margin {
                4
            } else if y < c4 - margin {
                5
            } else if y <= c4 + margin {
                6
            } else if y <= c5 - margin {
                7
            } else {
                8
            };
            return Ok(TREBLE_STAFF[index]);
        }

        let (side, outer, distance) = if y < top {
            (LedgerSide::Above, centers[0], centers[0] - y)
        } else {
            (LedgerSide::Below, centers[STAFF_LINES - 1], y - centers[STAFF_LINES - 1])
        };
        let nearest = (distance / step).round() as i32;
        let ledger_center = match side {
            LedgerSide::Above => outer - nearest as f64 * step,
            LedgerSide::Below => outer + nearest as f64 * step,
        };

        let (steps, space) = if (y - ledger_center).abs() <= margin {
            (nearest, false)
        } else {
            let beyond = match side {
                LedgerSide::Above => y < ledger_center,
                LedgerSide::Below => y > ledger_center,
            };
            if beyond {
                (nearest, true)
            } else if nearest > 0 {
                (nearest - 1, true)
            } else {
                // Inside the outer line's band but outside the bounds
                (0, false)
            }
        };
        ledger_pitch(side, steps, space).ok_or(OmrError::PitchOutOfRange { steps })
    }

    /// Draw all five fitted lines, `thickness` rows each
    pub fn render_into(&self, raster: &mut BinaryRaster, thickness: i32) {
        for line in &self.lines {
            line.render_into(raster, thickness);
        }
    }

    /// Order by top, bottom, left, right
    pub fn cmp_top(&self, other: &Staff) -> Ordering {
        let (a, b) = (&self.bounds, &other.bounds);
        a.top
            .cmp(&b.top)
            .then(a.bottom.cmp(&b.bottom))
            .then(a.left.cmp(&b.left))
            .then(a.right.cmp(&b.right))
    }

    /// Order by bottom, top, left, right
    pub fn cmp_bottom(&self, other: &Staff) -> Ordering {
        let (a, b) = (&self.bounds, &other.bounds);
        a.bottom
            .cmp(&b.bottom)
            .then(a.top.cmp(&b.top))
            .then(a.left.cmp(&b.left))
            .then(a.right.cmp(&b.right))
    }
}
