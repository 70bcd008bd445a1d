//! File-level helpers shared by the CLI and benches

use crate::config::ScanConfig;
use crate::detector::reconstructor::{StaffDetection, StaffReconstructor};
use crate::error::{OmrError, Result};
use crate::models::BinaryRaster;
use crate::utils::binarization::otsu_binarize;
use image::GenericImageView;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn max_dim_from_env() -> Option<u32> {
    match env::var("OMR_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Load an image as 8-bit luminance along with its dimensions.
///
/// Pages larger than `OMR_MAX_DIM` on their longest side are scaled down first.
pub fn load_gray<P: AsRef<Path>>(path: P) -> Result<(Vec<u8>, usize, usize)> {
    let img = image::open(path)?;
    let gray = match max_dim_from_env() {
        Some(max_dim) if img.dimensions().0.max(img.dimensions().1) > max_dim => img
            .resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
            .to_luma8(),
        _ => img.to_luma8(),
    };
    let (width, height) = gray.dimensions();
    Ok((gray.into_raw(), width as usize, height as usize))
}

/// Binarize luminance samples with Otsu's threshold.
pub fn binarize(gray: &[u8], width: usize, height: usize) -> BinaryRaster {
    otsu_binarize(gray, width, height)
}

/// Load an image and binarize it, dark pixels as ink.
pub fn load_binary<P: AsRef<Path>>(path: P) -> Result<BinaryRaster> {
    let (gray, width, height) = load_gray(path)?;
    Ok(binarize(&gray, width, height))
}

/// Write a raster as a black-on-white grayscale image.
pub fn save_raster<P: AsRef<Path>>(raster: &BinaryRaster, path: P) -> Result<()> {
    let expected = raster.width() * raster.height();
    let samples = raster.to_luma();
    let actual = samples.len();
    let image = image::GrayImage::from_raw(raster.width() as u32, raster.height() as u32, samples)
        .ok_or(OmrError::DimensionMismatch { expected, actual })?;
    image.save(path)?;
    Ok(())
}

/// Load, binarize and reconstruct the staffs of one page.
pub fn detect_file<P: AsRef<Path>>(path: P, config: &ScanConfig) -> Result<StaffDetection> {
    let raster = load_binary(path)?;
    StaffReconstructor::run(&raster, config)
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Ink coverage of a binary raster.
#[derive(Debug, Clone, Copy)]
pub struct InkStats {
    /// Count of ink pixels.
    pub ink_pixels: usize,
    /// Total pixels in the raster.
    pub total_pixels: usize,
    /// Ratio of ink pixels to total pixels.
    pub ink_ratio: f64,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    if gray.is_empty() {
        return GrayStats {
            min: 0,
            max: 0,
            avg: 0,
        };
    }
    let (min, max, sum) = gray.iter().fold((u8::MAX, u8::MIN, 0u64), |(lo, hi, sum), &v| {
        (lo.min(v), hi.max(v), sum + v as u64)
    });
    GrayStats {
        min,
        max,
        avg: (sum / gray.len() as u64) as u8,
    }
}

/// Compute ink coverage for a binary raster.
pub fn ink_stats(raster: &BinaryRaster) -> InkStats {
    let ink_pixels = raster.count_foreground();
    let total_pixels = raster.width() * raster.height();
    let ink_ratio = if total_pixels == 0 {
        0.0
    } else {
        ink_pixels as f64 / total_pixels as f64
    };
    InkStats {
        ink_pixels,
        total_pixels,
        ink_ratio,
    }
}

/// Directory of scanned pages named by `OMR_DATASET`, if set.
pub fn dataset_root_from_env() -> Option<PathBuf> {
    env::var_os("OMR_DATASET").map(PathBuf::from)
}

/// Page images under `root`, sorted, optionally truncated to `limit`.
pub fn page_paths<P: AsRef<Path>>(root: P, limit: Option<usize>) -> Vec<PathBuf> {
    let mut stack = vec![root.as_ref().to_path_buf()];
    let mut pages = Vec::new();

    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            let is_image = path.extension().is_some_and(|ext| {
                matches!(
                    ext.to_string_lossy().to_lowercase().as_str(),
                    "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tif" | "tiff"
                )
            });
            if is_image {
                pages.push(path);
            }
        }
    }

    pages.sort();
    if let Some(limit) = limit {
        pages.truncate(limit);
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("rust_omr_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_grayscale_stats() {
        let stats = grayscale_stats(&[10, 20, 30, 250]);
        assert_eq!(stats.min, 10);
        assert_eq!(stats.max, 250);
        assert_eq!(stats.avg, 77);
        assert_eq!(grayscale_stats(&[]).max, 0);
    }

    #[test]
    fn test_ink_stats() {
        let mut raster = BinaryRaster::new(4, 5);
        raster.set(0, 0, true);
        raster.set(3, 4, true);
        let stats = ink_stats(&raster);
        assert_eq!(stats.ink_pixels, 2);
        assert_eq!(stats.total_pixels, 20);
        assert!((stats.ink_ratio - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = temp_dir("roundtrip");
        let path = dir.join("page.png");
        let mut raster = BinaryRaster::new(12, 6);
        for x in 0..12 {
            raster.set(x, 2, true);
        }
        save_raster(&raster, &path).unwrap();
        let loaded = load_binary(&path).unwrap();
        assert_eq!(loaded.width(), 12);
        assert_eq!(loaded.height(), 6);
        assert_eq!(loaded.count_foreground(), 12);
        assert!(loaded.get(5, 2));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_file_is_image_error() {
        let result = load_gray("/nonexistent/rust_omr/page.png");
        assert!(matches!(result, Err(OmrError::Image(_))));
    }

    #[test]
    fn test_page_paths_filters_and_sorts() {
        let dir = temp_dir("pages");
        fs::create_dir_all(dir.join("sub")).unwrap();
        for name in ["b.png", "a.PNG", "notes.txt", "sub/c.tif"] {
            fs::write(dir.join(name), b"").unwrap();
        }
        let pages = page_paths(&dir, None);
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.strip_prefix(&dir).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.png", "sub/c.tif"]);
        assert_eq!(page_paths(&dir, Some(1)).len(), 1);
        let _ = fs::remove_dir_all(dir);
    }
}
