/// Staff hypothesis scanning using line/gap run matching down each column
use super::tolerance::Tolerances;
use crate::models::{BinaryRaster, Point, Range, STAFF_LINES, Staff, StaffLine};

/// Five line runs found in one column, as `(first row, length)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnStripe {
    /// Column the runs were found in
    pub x: i32,
    /// Line runs, top to bottom
    pub runs: [(i32, i32); STAFF_LINES],
}

impl ColumnStripe {
    fn end_row(&self) -> i32 {
        let (start, len) = self.runs[STAFF_LINES - 1];
        start + len
    }

    /// Each run touches or overlaps the run with the same index in `other`
    fn continues(&self, other: &ColumnStripe) -> bool {
        self.runs.iter().zip(other.runs.iter()).all(|(&(a, al), &(b, bl))| {
            let (a_top, a_bottom) = (a - 1, a + al);
            let (b_top, b_bottom) = (b, b + bl - 1);
            a_top <= b_bottom && b_top <= a_bottom
        })
    }
}

/// Stripes from adjacent columns chained into one hypothesis
struct Track {
    lines: [Vec<Point>; STAFF_LINES],
    last: ColumnStripe,
}

impl Track {
    fn start(stripe: ColumnStripe) -> Self {
        let mut track = Self {
            lines: Default::default(),
            last: stripe,
        };
        track.push(stripe);
        track
    }

    fn push(&mut self, stripe: ColumnStripe) {
        for (line, &(start, len)) in self.lines.iter_mut().zip(stripe.runs.iter()) {
            line.extend((start..start + len).map(|y| Point::new(stripe.x, y)));
        }
        self.last = stripe;
    }

    fn into_staff(self) -> Staff {
        Staff::new(self.lines.map(StaffLine::from_points))
    }
}

/// Column scanner producing raw staff hypotheses
pub struct StaffScanner;

impl StaffScanner {
    /// Scan every column and return staff hypotheses ordered by top bound
    pub fn detect(raster: &BinaryRaster, tol: &Tolerances) -> Vec<Staff> {
        let mut finished: Vec<Track> = Vec::new();
        let mut active: Vec<Track> = Vec::new();
        let mut stripe_count = 0usize;

        for x in 0..raster.width() as i32 {
            let stripes = Self::scan_column(raster, x, tol);
            stripe_count += stripes.len();

            let mut next_active = Vec::with_capacity(stripes.len());
            for stripe in stripes {
                match active.iter().position(|t| stripe.continues(&t.last)) {
                    Some(idx) => {
                        let mut track = active.swap_remove(idx);
                        track.push(stripe);
                        next_active.push(track);
                    }
                    None => next_active.push(Track::start(stripe)),
                }
            }
            // Tracks without a stripe in this column are closed
            finished.append(&mut active);
            active = next_active;
        }
        finished.append(&mut active);

        let mut staffs: Vec<Staff> = finished.into_iter().map(Track::into_staff).collect();
        staffs.sort_by(|a, b| a.cmp_top(b));
        log::debug!(
            "scan: {} column stripes chained into {} staff hypotheses",
            stripe_count,
            staffs.len()
        );
        staffs
    }

    /// All five-line stripes in column `x`, top to bottom
    pub fn scan_column(raster: &BinaryRaster, x: i32, tol: &Tolerances) -> Vec<ColumnStripe> {
        let height = raster.height() as i32;
        let mut stripes = Vec::new();
        let mut y = 0;

        while y < height {
            if !raster.is_foreground(x, y) {
                y += 1;
                continue;
            }

            match Self::match_stripe(raster, x, y, tol) {
                Some(stripe) => {
                    y = stripe.end_row();
                    stripes.push(stripe);
                }
                None => {
                    // Do not retry from inside the run that just failed
                    while y < height && raster.is_foreground(x, y) {
                        y += 1;
                    }
                }
            }
        }

        stripes
    }

    /// Line, gap, line, ... line: five lines and four gaps starting at `(x, y)`
    pub fn match_stripe(
        raster: &BinaryRaster,
        x: i32,
        y: i32,
        tol: &Tolerances,
    ) -> Option<ColumnStripe> {
        let mut runs = [(0, 0); STAFF_LINES];
        let mut cursor = y;

        for (i, run) in runs.iter_mut().enumerate() {
            let len = Self::line_run(raster, x, cursor, tol.scan_height)?;
            *run = (cursor, len);
            cursor += len;

            if i + 1 < STAFF_LINES {
                cursor += Self::gap_run(raster, x, cursor, tol.scan_distance)?;
            }
        }

        Some(ColumnStripe { x, runs })
    }

    /// Foreground run from `y`, at most `range.upper()` rows
    fn line_run(raster: &BinaryRaster, x: i32, y: i32, range: Range) -> Option<i32> {
        let mut len = 0;
        while len < range.upper() && raster.is_foreground(x, y + len) {
            len += 1;
        }
        (len >= range.lower()).then_some(len)
    }

    /// Background run from `y`; must end on foreground and fit `range`
    fn gap_run(raster: &BinaryRaster, x: i32, y: i32, range: Range) -> Option<i32> {
        let height = raster.height() as i32;
        let mut len = 0;
        while len <= range.upper() {
            let row = y + len;
            if row >= height {
                return None;
            }
            if raster.is_foreground(x, row) {
                return range.contains(len).then_some(len);
            }
            len += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::detector::metrics::StaffMetrics;

    const ROWS: [usize; 10] = [10, 11, 20, 21, 30, 31, 40, 41, 50, 51];

    fn staff_page(width: usize, height: usize) -> BinaryRaster {
        let mut raster = BinaryRaster::new(width, height);
        for y in ROWS {
            for x in 0..width {
                raster.set(x, y, true);
            }
        }
        raster
    }

    fn tolerances_for(raster: &BinaryRaster) -> Tolerances {
        Tolerances::from_metrics(&StaffMetrics::collect(raster), &ScanConfig::default()).unwrap()
    }

    #[test]
    fn test_match_stripe() {
        let raster = staff_page(4, 60);
        let tol = tolerances_for(&raster);
        let stripe = StaffScanner::match_stripe(&raster, 0, 10, &tol).unwrap();
        assert_eq!(stripe.runs, [(10, 2), (20, 2), (30, 2), (40, 2), (50, 2)]);
        // The widened height band accepts a one-row first line
        assert!(StaffScanner::match_stripe(&raster, 0, 11, &tol).is_some());
        assert!(StaffScanner::match_stripe(&raster, 0, 20, &tol).is_none());
    }

    #[test]
    fn test_single_staff() {
        let raster = staff_page(200, 70);
        let tol = tolerances_for(&raster);
        let staffs = StaffScanner::detect(&raster, &tol);
        assert_eq!(staffs.len(), 1);
        assert_eq!(staffs[0].top_bound(), 10);
        assert_eq!(staffs[0].bottom_bound(), 51);
        assert_eq!(staffs[0].horizontal_coverage(), 200);
    }

    #[test]
    fn test_thick_line_fails_fast() {
        let mut raster = staff_page(1, 70);
        raster.set(0, 12, true);
        raster.set(0, 13, true);
        let tol = Tolerances::from_metrics(
            &StaffMetrics::collect(&staff_page(10, 70)),
            &ScanConfig::default(),
        )
        .unwrap();
        assert!(StaffScanner::scan_column(&raster, 0, &tol).is_empty());
    }

    #[test]
    fn test_gap_break_splits_hypotheses() {
        let mut raster = staff_page(200, 70);
        for x in 90..110 {
            raster.set(x, 20, false);
            raster.set(x, 21, false);
        }
        let tol = tolerances_for(&raster);
        let staffs = StaffScanner::detect(&raster, &tol);
        assert_eq!(staffs.len(), 2);
        assert_eq!(staffs[0].horizontal_coverage(), 90);
        assert_eq!(staffs[1].horizontal_coverage(), 90);
        assert_eq!(staffs[0].left_bound(), 0);
        assert_eq!(staffs[1].left_bound(), 110);
    }

    #[test]
    fn test_two_staffs_in_one_column() {
        let mut raster = staff_page(50, 140);
        for y in ROWS {
            for x in 0..50 {
                raster.set(x, y + 70, true);
            }
        }
        let tol = tolerances_for(&raster);
        let stripes = StaffScanner::scan_column(&raster, 0, &tol);
        assert_eq!(stripes.len(), 2);
        let staffs = StaffScanner::detect(&raster, &tol);
        assert_eq!(staffs.len(), 2);
        assert_eq!(staffs[1].top_bound(), 80);
    }

    #[test]
    fn test_skewed_staff_is_tracked() {
        let mut raster = BinaryRaster::new(120, 80);
        for x in 0..120usize {
            let shift = x / 40;
            for y in ROWS {
                raster.set(x, y + shift, true);
            }
        }
        let tol = tolerances_for(&raster);
        let staffs = StaffScanner::detect(&raster, &tol);
        assert_eq!(staffs.len(), 1);
        assert_eq!(staffs[0].horizontal_coverage(), 120);
        let slope = staffs[0].line(0).line_equation().unwrap().slope().unwrap();
        assert!(slope > 0.0);
    }
}
