//! Page-level staff reconstruction pipeline
//!
//! binary raster → metrics (parallel) → tolerance bands → column scan →
//! component merge → separated-staff merge → final staffs ordered by top.
use std::time::Instant;

use super::merge::{merge_components, merge_separated};
use super::metrics::{MetricKind, StaffMetrics};
use super::scanner::StaffScanner;
use super::tolerance::Tolerances;
use crate::config::ScanConfig;
use crate::error::Result;
use crate::models::{BinaryRaster, Pitch, Staff};
use crate::utils::line_removal::remove_lines;
use crate::utils::render::render_staffs;

/// Staffs found on one page together with the statistics used to find them
#[derive(Debug, Clone)]
pub struct StaffDetection {
    width: usize,
    height: usize,
    metrics: StaffMetrics,
    tolerances: Option<Tolerances>,
    staffs: Vec<Staff>,
}

impl StaffDetection {
    /// Page statistics, including one staff-height observation per staff
    pub fn metrics(&self) -> &StaffMetrics {
        &self.metrics
    }

    /// Tolerance bands; `None` when the page had no runs to measure
    pub fn tolerances(&self) -> Option<&Tolerances> {
        self.tolerances.as_ref()
    }

    /// Staffs ordered by top bound
    pub fn staffs(&self) -> &[Staff] {
        &self.staffs
    }

    /// Consume the detection, keeping the staffs
    pub fn into_staffs(self) -> Vec<Staff> {
        self.staffs
    }

    /// Page width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Page height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raster holding only the fitted staff lines, for diagnostics
    pub fn staff_line_raster(&self) -> BinaryRaster {
        let thickness = self.tolerances.map_or(1, |t| t.line_thickness);
        render_staffs(&self.staffs, self.width, self.height, thickness)
    }

    /// Erase staff lines from `page` while keeping symbols that cross them
    pub fn remove_staff_lines(&self, page: &BinaryRaster, eight_way: bool) -> BinaryRaster {
        remove_lines(page, &self.staff_line_raster(), eight_way)
    }

    /// Index of the staff closest to row `y`
    pub fn nearest_staff(&self, y: i32) -> Option<usize> {
        self.staffs
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| {
                if y < s.top_bound() {
                    s.top_bound() - y
                } else if y > s.bottom_bound() {
                    y - s.bottom_bound()
                } else {
                    0
                }
            })
            .map(|(i, _)| i)
    }

    /// Treble pitch of `(x, y)` relative to staff `staff_index`
    pub fn pitch_at(&self, staff_index: usize, x: f64, y: f64) -> Option<Result<Pitch>> {
        let staff = self.staffs.get(staff_index)?;
        let tol = self.tolerances.as_ref()?;
        Some(staff.pitch_treble(x, y, tol))
    }
}

/// Runs the full reconstruction for one page
pub struct StaffReconstructor;

impl StaffReconstructor {
    /// Reconstruct every staff on `raster`
    ///
    /// Fails only on malformed input; a page without staffs yields an empty
    /// detection.
    pub fn run(raster: &BinaryRaster, config: &ScanConfig) -> Result<StaffDetection> {
        raster.validate()?;
        let (width, height) = (raster.width(), raster.height());
        let started = Instant::now();

        let mut metrics = StaffMetrics::collect(raster);
        if !metrics.has_observations(MetricKind::LineHeight)
            || !metrics.has_observations(MetricKind::LineDistance)
        {
            log::debug!("no foreground runs to measure on {}x{} page", width, height);
            return Ok(StaffDetection {
                width,
                height,
                metrics,
                tolerances: None,
                staffs: Vec::new(),
            });
        }
        let tol = Tolerances::from_metrics(&metrics, config)?;

        let hypotheses = StaffScanner::detect(raster, &tol);
        let merged = merge_components(hypotheses, &tol, width, height);
        let staffs = merge_separated(merged, &tol, config.min_staff_width(width));

        for staff in &staffs {
            metrics.record_staff_height(staff.height());
        }

        log::debug!(
            "reconstructed {} staffs on {}x{} page in {:?}",
            staffs.len(),
            width,
            height,
            started.elapsed()
        );

        Ok(StaffDetection {
            width,
            height,
            metrics,
            tolerances: Some(tol),
            staffs,
        })
    }
}
