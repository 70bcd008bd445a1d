use crate::models::BinaryRaster;

/// Convert a grayscale page to a binary raster using Otsu's threshold
/// Returns a BinaryRaster where true = ink (dark), false = paper
pub fn otsu_binarize(gray: &[u8], width: usize, height: usize) -> BinaryRaster {
    let threshold = calculate_otsu_threshold(gray);
    threshold_binarize(gray, width, height, threshold)
}

/// Calculate Otsu's optimal threshold
pub fn calculate_otsu_threshold(gray: &[u8]) -> u8 {
    // Build histogram
    let mut histogram = [0u64; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }

    let total_pixels = gray.len() as f64;
    let total_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut max_variance = 0.0;
    let mut optimal_threshold = 128u8;
    let mut class1_pixels = 0.0f64;
    let mut class1_sum = 0.0f64;

    // Pixels below `threshold` form the dark class
    for threshold in 1..=255usize {
        let count = histogram[threshold - 1] as f64;
        class1_pixels += count;
        class1_sum += (threshold - 1) as f64 * count;

        let class2_pixels = total_pixels - class1_pixels;
        if class1_pixels == 0.0 || class2_pixels == 0.0 {
            continue;
        }

        let class1_mean = class1_sum / class1_pixels;
        let class2_mean = (total_sum - class1_sum) / class2_pixels;
        let weight1 = class1_pixels / total_pixels;
        let weight2 = class2_pixels / total_pixels;

        let variance = weight1 * weight2 * (class1_mean - class2_mean).powi(2);
        if variance > max_variance {
            max_variance = variance;
            optimal_threshold = threshold as u8;
        }
    }

    optimal_threshold
}

/// Simple global threshold binarization
pub fn threshold_binarize(gray: &[u8], width: usize, height: usize, threshold: u8) -> BinaryRaster {
    let mut binary = BinaryRaster::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            binary.set(x, y, gray[idx] < threshold);
        }
    }

    binary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_binarize() {
        let gray = vec![100, 150, 200, 50]; // 2x2 image
        let binary = threshold_binarize(&gray, 2, 2, 128);

        // Pixels < 128 are ink
        assert!(binary.get(0, 0)); // 100 < 128
        assert!(!binary.get(1, 0)); // 150 >= 128
        assert!(!binary.get(0, 1)); // 200 >= 128
        assert!(binary.get(1, 1)); // 50 < 128
    }

    #[test]
    fn test_otsu_binarize() {
        // Staff-like page: dark rows on white paper
        let mut gray = vec![240u8; 100];
        for x in 0..10 {
            gray[30 + x] = 20;
            gray[60 + x] = 35;
        }

        let threshold = calculate_otsu_threshold(&gray);
        assert!(threshold > 35 && threshold <= 240);

        let binary = otsu_binarize(&gray, 10, 10);
        assert!(binary.get(0, 3));
        assert!(binary.get(9, 6));
        assert!(!binary.get(0, 0));
        assert_eq!(binary.count_foreground(), 20);
    }
}
