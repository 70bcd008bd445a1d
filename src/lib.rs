//! RustOMR - staff-line reconstruction for optical music recognition
//!
//! Finds the five-line staffs on a binarized score page, consolidates the
//! fragments a column scan produces into whole staffs, and maps positions on a
//! staff to treble-clef pitches.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Tunable thresholds for the pipeline
pub mod config;
/// Staff detection modules (metrics, scanning, labeling, merging)
pub mod detector;
/// Error type shared by the pipeline
pub mod error;
/// Core data structures (BinaryRaster, StaffLine, Staff, Pitch, etc.)
pub mod models;
/// Image loading and saving for the CLI and benches
pub mod tools;
/// Utility functions (binarization, rendering, line removal)
pub mod utils;

pub use config::ScanConfig;
pub use detector::metrics::{MetricKind, StaffMetrics};
pub use detector::reconstructor::{StaffDetection, StaffReconstructor};
pub use error::{OmrError, Result};
pub use models::{BinaryRaster, Letter, Pitch, Point, Range, Staff, StaffLine};

use utils::binarization::otsu_binarize;

/// Reconstruct the staffs of a binary page with default thresholds
///
/// # Arguments
/// * `raster` - Page with ink as foreground
///
/// # Returns
/// Staffs ordered top to bottom together with the page metrics
pub fn detect_staffs(raster: &BinaryRaster) -> Result<StaffDetection> {
    detect_staffs_with_config(raster, &ScanConfig::default())
}

/// Reconstruct the staffs of a binary page with explicit thresholds
pub fn detect_staffs_with_config(
    raster: &BinaryRaster,
    config: &ScanConfig,
) -> Result<StaffDetection> {
    StaffReconstructor::run(raster, config)
}

/// Reconstruct the staffs of an 8-bit grayscale page
///
/// The page is binarized with Otsu's threshold first; dark pixels are ink.
pub fn detect_staffs_from_luma(
    samples: &[u8],
    width: usize,
    height: usize,
) -> Result<StaffDetection> {
    let expected = width * height;
    if samples.len() != expected {
        return Err(OmrError::DimensionMismatch {
            expected,
            actual: samples.len(),
        });
    }
    detect_staffs(&otsu_binarize(samples, width, height))
}

/// Detector holding its configuration across pages
#[derive(Debug, Clone, Default)]
pub struct StaffDetector {
    config: ScanConfig,
}

impl StaffDetector {
    /// Create a detector with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with explicit thresholds
    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Create a detector whose thresholds come from `OMR_*` variables
    pub fn from_env() -> Self {
        Self::with_config(ScanConfig::from_env())
    }

    /// Thresholds in use
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Reconstruct the staffs of one page
    pub fn detect(&self, raster: &BinaryRaster) -> Result<StaffDetection> {
        StaffReconstructor::run(raster, &self.config)
    }

    /// Reconstruct and keep only the staffs
    pub fn detect_staffs(&self, raster: &BinaryRaster) -> Result<Vec<Staff>> {
        self.detect(raster).map(StaffDetection::into_staffs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> BinaryRaster {
        let mut raster = BinaryRaster::new(100, 70);
        for top in [10, 20, 30, 40, 50] {
            for x in 0..100 {
                raster.set(x, top, true);
                raster.set(x, top + 1, true);
            }
        }
        raster
    }

    #[test]
    fn test_detect_empty() {
        let detection = detect_staffs(&BinaryRaster::new(10, 10)).unwrap();
        assert!(detection.staffs().is_empty());
    }

    #[test]
    fn test_detector_matches_free_function() {
        let raster = page();
        let detector = StaffDetector::new();
        let staffs = detector.detect_staffs(&raster).unwrap();
        assert_eq!(staffs, detect_staffs(&raster).unwrap().into_staffs());
        assert_eq!(staffs.len(), 1);
        assert_eq!(staffs[0].top_bound(), 10);
    }

    #[test]
    fn test_detect_from_luma() {
        let luma = page().to_luma();
        let detection = detect_staffs_from_luma(&luma, 100, 70).unwrap();
        assert_eq!(detection.staffs().len(), 1);
        assert!(matches!(
            detect_staffs_from_luma(&luma, 100, 69),
            Err(OmrError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_strict_coverage_drops_short_staff() {
        let mut raster = BinaryRaster::new(200, 70);
        for top in [10, 20, 30, 40, 50] {
            for x in 0..80 {
                raster.set(x, top, true);
                raster.set(x, top + 1, true);
            }
        }
        let config = ScanConfig {
            min_coverage_fraction: 0.5,
            ..ScanConfig::default()
        };
        let detector = StaffDetector::with_config(config);
        assert!(detector.detect_staffs(&raster).unwrap().is_empty());
        assert_eq!(detector.config().min_coverage_fraction, 0.5);
    }
}
