//! Run-length statistics of a sheet-music page
//!
//! Every column is scanned top to bottom. Each foreground run is one
//! line-height observation and each background run that ends in foreground is
//! one line-distance observation. On a page of staffs the modes of those two
//! histograms are the staff-line thickness and the gap between lines.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;

use crate::error::{OmrError, Result};
use crate::models::{BinaryRaster, Range};

/// Which histogram a query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Thickness of a foreground run
    LineHeight,
    /// Background gap between two foreground runs
    LineDistance,
    /// Full height of an accepted staff
    StaffHeight,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::LineHeight => "line height",
            MetricKind::LineDistance => "line distance",
            MetricKind::StaffHeight => "staff height",
        };
        f.write_str(name)
    }
}

/// Value → occurrence count, with the mode kept current on every insert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Histogram {
    counts: BTreeMap<i32, u32>,
    // (value, frequency); ties resolve to the smaller value
    mode: Option<(i32, u32)>,
}

impl Histogram {
    fn record(&mut self, value: i32, times: u32) {
        let count = self.counts.entry(value).or_insert(0);
        *count += times;
        let count = *count;
        self.mode = match self.mode {
            Some((mode, freq)) if count < freq || (count == freq && value > mode) => {
                Some((mode, freq))
            }
            _ => Some((value, count)),
        };
    }

    fn merge(&mut self, other: &Histogram) {
        for (&value, &count) in &other.counts {
            self.record(value, count);
        }
    }

    fn total(&self) -> u64 {
        self.counts.values().map(|&c| c as u64).sum()
    }

    fn mode_range(&self, threshold: f64) -> Option<Range> {
        let (_, mode_freq) = self.mode?;
        let cutoff = threshold * mode_freq as f64;
        let mut survivors = self
            .counts
            .iter()
            .filter(|&(_, &count)| count as f64 >= cutoff)
            .map(|(&value, _)| value);
        let lower = survivors.next()?;
        let upper = survivors.last().unwrap_or(lower);
        Some(Range::new(lower, upper))
    }
}

/// Histograms of line heights, line distances and staff heights for one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffMetrics {
    line_heights: Histogram,
    line_distances: Histogram,
    staff_heights: Histogram,
}

impl StaffMetrics {
    /// Empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every column of `raster` in parallel and merge the partial histograms
    pub fn collect(raster: &BinaryRaster) -> Self {
        let metrics = (0..raster.width())
            .into_par_iter()
            .fold(StaffMetrics::new, |mut acc, x| {
                acc.scan_column(raster, x);
                acc
            })
            .reduce(StaffMetrics::new, |mut a, b| {
                a.merge(&b);
                a
            });

        log::debug!(
            "metrics: {} height samples, {} distance samples over {} columns",
            metrics.observation_count(MetricKind::LineHeight),
            metrics.observation_count(MetricKind::LineDistance),
            raster.width()
        );
        metrics
    }

    /// Record the runs of a single column
    ///
    /// A foreground run still open at the bottom edge is not recorded, and
    /// the gap above the first run counts as a distance.
    pub fn scan_column(&mut self, raster: &BinaryRaster, x: usize) {
        let mut run_start: Option<usize> = None;
        let mut last_end: Option<usize> = None;

        for y in 0..raster.height() {
            if raster.get(x, y) {
                if run_start.is_none() {
                    run_start = Some(y);
                    if y != 0 {
                        let gap = match last_end {
                            Some(end) => y - end - 1,
                            None => y,
                        };
                        self.record_line_distance(gap as i32);
                    }
                }
            } else if let Some(start) = run_start.take() {
                self.record_line_height((y - start) as i32);
                last_end = Some(y - 1);
            }
        }
    }

    /// Add one line-height observation
    pub fn record_line_height(&mut self, height: i32) {
        self.line_heights.record(height, 1);
    }

    /// Add one line-distance observation
    pub fn record_line_distance(&mut self, distance: i32) {
        self.line_distances.record(distance, 1);
    }

    /// Add one staff-height observation
    pub fn record_staff_height(&mut self, height: i32) {
        self.staff_heights.record(height, 1);
    }

    /// Histogram addition; order of merging never changes the result
    pub fn merge(&mut self, other: &StaffMetrics) {
        self.line_heights.merge(&other.line_heights);
        self.line_distances.merge(&other.line_distances);
        self.staff_heights.merge(&other.staff_heights);
    }

    fn histogram(&self, kind: MetricKind) -> &Histogram {
        match kind {
            MetricKind::LineHeight => &self.line_heights,
            MetricKind::LineDistance => &self.line_distances,
            MetricKind::StaffHeight => &self.staff_heights,
        }
    }

    /// Raw value → count map for `kind`
    pub fn frequencies(&self, kind: MetricKind) -> &BTreeMap<i32, u32> {
        &self.histogram(kind).counts
    }

    /// Total number of observations for `kind`
    pub fn observation_count(&self, kind: MetricKind) -> u64 {
        self.histogram(kind).total()
    }

    /// Check whether any observation of `kind` has been recorded
    pub fn has_observations(&self, kind: MetricKind) -> bool {
        self.histogram(kind).mode.is_some()
    }

    /// Most frequent value; on equal frequency the smallest value wins
    pub fn mode(&self, kind: MetricKind) -> Result<i32> {
        self.histogram(kind)
            .mode
            .map(|(value, _)| value)
            .ok_or(OmrError::NoObservations(kind))
    }

    /// Span of every value seen at least `threshold × mode frequency` times
    pub fn mode_range(&self, kind: MetricKind, threshold: f64) -> Result<Range> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(OmrError::InvalidThreshold(threshold));
        }
        self.histogram(kind)
            .mode_range(threshold)
            .ok_or(OmrError::NoObservations(kind))
    }

    /// Modal staff-line thickness
    pub fn mode_line_height(&self) -> Result<i32> {
        self.mode(MetricKind::LineHeight)
    }

    /// Modal gap between staff lines
    pub fn mode_line_distance(&self) -> Result<i32> {
        self.mode(MetricKind::LineDistance)
    }

    /// Modal full staff height
    pub fn mode_staff_height(&self) -> Result<i32> {
        self.mode(MetricKind::StaffHeight)
    }
}
