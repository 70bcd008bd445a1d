//! Staff detection modules
//!
//! This module contains all the logic for reconstructing staffs from a page:
//! - Run-length statistics (line thickness and spacing)
//! - Column scanning for five-line stripes
//! - Connected-component labeling of rendered hypotheses
//! - Merging fragmented and duplicated hypotheses

/// Two-pass connected-component labeling with union-find
pub mod connected_components;
/// Component merge and separated-staff merge
pub mod merge;
/// Line height / line distance histograms and their modes
pub mod metrics;
/// Page pipeline driver and its result
pub mod reconstructor;
/// Line/gap state machine run down each column
pub mod scanner;
/// Tolerance bands derived from the page metrics
pub mod tolerance;
