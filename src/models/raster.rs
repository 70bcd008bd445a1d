use super::Point;
use crate::error::{OmrError, Result};

/// Compact binary raster; `true` marks a foreground (ink) pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryRaster {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinaryRaster {
    /// Create an all-background raster with given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Build from one bool per pixel, row-major
    pub fn from_pixels(width: usize, height: usize, pixels: &[bool]) -> Result<Self> {
        Self::check_shape(width, height, pixels.len())?;
        let mut raster = Self::new(width, height);
        for (idx, &value) in pixels.iter().enumerate() {
            if value {
                raster.set(idx % width, idx / width, true);
            }
        }
        Ok(raster)
    }

    /// Build from 8-bit samples, treating pixels equal to `foreground` as ink
    pub fn from_luma(width: usize, height: usize, samples: &[u8], foreground: u8) -> Result<Self> {
        Self::check_shape(width, height, samples.len())?;
        let mut raster = Self::new(width, height);
        for (idx, &value) in samples.iter().enumerate() {
            if value == foreground {
                raster.set(idx % width, idx / width, true);
            }
        }
        Ok(raster)
    }

    fn check_shape(width: usize, height: usize, actual: usize) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(OmrError::EmptyRaster { width, height });
        }
        let expected = width * height;
        if actual != expected {
            return Err(OmrError::DimensionMismatch { expected, actual });
        }
        Ok(())
    }

    /// Reject rasters with a zero dimension
    pub fn validate(&self) -> Result<()> {
        Self::check_shape(self.width, self.height, self.width * self.height)
    }

    /// Get raster width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get raster height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get pixel at (x, y); out-of-bounds reads are background
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Signed variant of [`get`](Self::get) for geometry code
    pub fn is_foreground(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.get(x as usize, y as usize)
    }

    /// Foreground test for a point
    pub fn contains_point(&self, p: Point) -> bool {
        self.is_foreground(p.x, p.y)
    }

    /// Set pixel at (x, y); out-of-bounds writes are ignored
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        let byte_index = index / 8;
        let bit_index = index % 8;
        if value {
            self.data[byte_index] |= 1 << bit_index;
        } else {
            self.data[byte_index] &= !(1 << bit_index);
        }
    }

    /// Signed variant of [`set`](Self::set); negative coordinates are ignored
    pub fn set_signed(&mut self, x: i32, y: i32, value: bool) {
        if x < 0 || y < 0 {
            return;
        }
        self.set(x as usize, y as usize, value);
    }

    /// Clear all pixels to background
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Number of foreground pixels
    pub fn count_foreground(&self) -> usize {
        let full = self.width * self.height;
        let mut count = 0usize;
        for (i, byte) in self.data.iter().enumerate() {
            let mut b = *byte;
            // Mask padding bits in the final byte
            let start = i * 8;
            if start + 8 > full {
                b &= ((1u16 << (full - start)) - 1) as u8;
            }
            count += b.count_ones() as usize;
        }
        count
    }

    /// 8-bit samples with ink as 0 and paper as 255, ready for image export
    pub fn to_luma(&self) -> Vec<u8> {
        let mut out = vec![255u8; self.width * self.height];
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    out[y * self.width + x] = 0;
                }
            }
        }
        out
    }
}

impl Default for BinaryRaster {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
