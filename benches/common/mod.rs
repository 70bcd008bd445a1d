#![allow(dead_code)]

use rust_omr::BinaryRaster;
use rust_omr::tools::{dataset_root_from_env, page_paths};
use std::env;
use std::path::PathBuf;

/// Page with `staffs` evenly spaced five-line staffs, two-pixel lines eight
/// pixels apart, a stem every 40 columns and a short break in every third staff.
pub fn synthetic_score(width: usize, height: usize, staffs: usize) -> BinaryRaster {
    let mut raster = BinaryRaster::new(width, height);
    let pitch = height / (staffs + 1);
    for s in 0..staffs {
        let top = pitch / 2 + s * pitch;
        for line in 0..5 {
            let y = top + line * 10;
            for x in 0..width {
                if s % 3 == 2 && line == 1 && (width / 2..width / 2 + 12).contains(&x) {
                    continue;
                }
                raster.set(x, y, true);
                raster.set(x, y + 1, true);
            }
        }
        for x in (20..width).step_by(40) {
            for y in top.saturating_sub(15)..top + 30 {
                raster.set(x, y, true);
            }
        }
    }
    raster
}

/// Pages from `OMR_DATASET`, capped by `OMR_BENCH_LIMIT` (default 5, 0 = all)
pub fn dataset_pages() -> Vec<PathBuf> {
    let Some(root) = dataset_root_from_env() else {
        return Vec::new();
    };
    let limit = match env::var("OMR_BENCH_LIMIT") {
        Ok(value) => value.parse::<usize>().ok().filter(|&v| v != 0),
        Err(_) => Some(5),
    };
    page_paths(root, limit)
}

/// Grayscale rendering of a raster
pub fn to_gray(raster: &BinaryRaster) -> Vec<u8> {
    raster.to_luma()
}
