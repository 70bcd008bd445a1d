//! Tolerance bands derived once per page from [`StaffMetrics`]
use super::metrics::{MetricKind, StaffMetrics};
use crate::config::ScanConfig;
use crate::error::Result;
use crate::models::Range;

/// Every size threshold the scanner, merge passes and pitch mapping consult
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Mode range of line heights
    pub height_band: Range,
    /// Mode range of line distances
    pub distance_band: Range,
    /// `height_band` with its lower bound widened, used by the scanner
    pub scan_height: Range,
    /// `distance_band` with its upper bound widened, used by the scanner
    pub scan_distance: Range,
    /// `height_band.upper`: rows drawn per column when rendering a fitted line
    pub line_thickness: i32,
    /// `ceil(height_band.upper / 2)`: containment margin around a fitted line
    pub line_margin: i32,
    /// `ceil(distance_band.upper / 2)`: vertical slack when pairing staff bounds
    pub staff_margin: i32,
    /// Modal line thickness
    pub line_height: i32,
    /// Modal gap between lines
    pub line_distance: i32,
}

impl Tolerances {
    /// Derive the bands; fails when either histogram is still empty
    pub fn from_metrics(metrics: &StaffMetrics, config: &ScanConfig) -> Result<Self> {
        let height_band = metrics.mode_range(MetricKind::LineHeight, config.mode_threshold)?;
        let distance_band = metrics.mode_range(MetricKind::LineDistance, config.mode_threshold)?;

        let mut scan_height = height_band.widen(config.height_widen, 0);
        if scan_height.lower() < 1 {
            scan_height = Range::new(1, scan_height.upper());
        }
        let scan_distance = distance_band.widen(0, config.distance_widen);

        let tolerances = Self {
            height_band,
            distance_band,
            scan_height,
            scan_distance,
            line_thickness: height_band.upper(),
            line_margin: half_ceil(height_band.upper()),
            staff_margin: half_ceil(distance_band.upper()),
            line_height: metrics.mode_line_height()?,
            line_distance: metrics.mode_line_distance()?,
        };
        log::debug!(
            "tolerances: height {:?} distance {:?} line margin {} staff margin {}",
            tolerances.scan_height,
            tolerances.scan_distance,
            tolerances.line_margin,
            tolerances.staff_margin
        );
        Ok(tolerances)
    }

    /// Ink-to-ink spacing of adjacent lines; one ledger step
    pub fn line_center_distance(&self) -> f64 {
        (self.line_height + self.line_distance) as f64
    }

    /// Half-band around a line or ledger centre that still counts as "on" it
    pub fn pitch_margin(&self) -> f64 {
        self.line_distance as f64 / 4.0 + self.line_height as f64 / 2.0
    }
}

fn half_ceil(value: i32) -> i32 {
    (value + 1).div_euclid(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(height: i32, distance: i32) -> StaffMetrics {
        let mut metrics = StaffMetrics::new();
        for _ in 0..10 {
            metrics.record_line_height(height);
            metrics.record_line_distance(distance);
        }
        metrics
    }

    #[test]
    fn test_scan_bands_are_widened() {
        let tol = Tolerances::from_metrics(&metrics(2, 8), &ScanConfig::default()).unwrap();
        assert_eq!((tol.scan_height.lower(), tol.scan_height.upper()), (1, 2));
        assert_eq!((tol.scan_distance.lower(), tol.scan_distance.upper()), (8, 9));
        assert_eq!(tol.line_thickness, 2);
        assert_eq!(tol.line_margin, 1);
        assert_eq!(tol.staff_margin, 4);
        assert!((tol.line_center_distance() - 10.0).abs() < 1e-12);
        assert!((tol.pitch_margin() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_margins_round_up() {
        let tol = Tolerances::from_metrics(&metrics(3, 9), &ScanConfig::default()).unwrap();
        assert_eq!(tol.line_thickness, 3);
        assert_eq!(tol.line_margin, 2);
        assert_eq!(tol.staff_margin, 5);
    }

    #[test]
    fn test_height_never_below_one() {
        let config = ScanConfig {
            height_widen: 3,
            ..ScanConfig::default()
        };
        let tol = Tolerances::from_metrics(&metrics(1, 8), &config).unwrap();
        assert_eq!(tol.scan_height.lower(), 1);
    }

    #[test]
    fn test_requires_observations() {
        assert!(Tolerances::from_metrics(&StaffMetrics::new(), &ScanConfig::default()).is_err());
    }
}
