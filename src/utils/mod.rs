//! Raster helpers around the reconstruction pipeline
//!
//! - Binarization (Otsu's method and fixed threshold) for loading scans
//! - Rendering fitted staffs back into a raster
//! - Staff-line removal that keeps symbols crossing the lines

pub mod binarization;
pub mod line_removal;
pub mod render;
