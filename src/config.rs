//! Tunable thresholds for staff reconstruction
//!
//! Every value is passed explicitly into the pipeline; `ScanConfig::from_env`
//! only reads the environment once, when the caller asks for it.

fn parse_env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(default)
}

fn parse_env_i32(name: &str, default: i32) -> i32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<i32>().ok())
        .unwrap_or(default)
}

/// Thresholds consulted by the scanner and both merge passes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanConfig {
    /// Fraction of the modal frequency a value needs to join the tolerance band
    pub mode_threshold: f64,
    /// Rows subtracted from the lower bound of the line-height band while scanning
    pub height_widen: i32,
    /// Rows added to the upper bound of the line-distance band while scanning
    pub distance_widen: i32,
    /// Fraction of the page width a consolidated staff must cover to be kept
    pub min_coverage_fraction: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mode_threshold: 0.33,
            height_widen: 1,
            distance_widen: 1,
            min_coverage_fraction: 0.5,
        }
    }
}

impl ScanConfig {
    /// Defaults overridden by `OMR_MODE_THRESHOLD`, `OMR_HEIGHT_WIDEN`,
    /// `OMR_DISTANCE_WIDEN` and `OMR_MIN_COVERAGE`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            mode_threshold: parse_env_f64("OMR_MODE_THRESHOLD", defaults.mode_threshold)
                .clamp(0.0, 1.0),
            height_widen: parse_env_i32("OMR_HEIGHT_WIDEN", defaults.height_widen).max(0),
            distance_widen: parse_env_i32("OMR_DISTANCE_WIDEN", defaults.distance_widen).max(0),
            min_coverage_fraction: parse_env_f64("OMR_MIN_COVERAGE", defaults.min_coverage_fraction)
                .clamp(0.0, 1.0),
        }
    }

    /// Minimum accumulated coverage for a page `width` pixels wide
    pub fn min_staff_width(&self, width: usize) -> i32 {
        (width as f64 * self.min_coverage_fraction).ceil() as i32
    }
}
