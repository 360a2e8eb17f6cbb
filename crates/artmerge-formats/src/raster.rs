//! Decoded tile images
//!
//! Pixels are 16-bit cells: 15-bit RGB (5-5-5) in the low bits and bit 15 as
//! the presence flag. A cell of zero is "no pixel".

use crate::error::{FormatError, FormatResult};

/// Presence flag set on every encoded pixel
pub const PRESENCE_BIT: u16 = 0x8000;

/// Width and height of every land tile
pub const LAND_SIZE: u16 = 44;

/// An owned width x height grid of 16-bit pixels, row-major
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Raster {
    width: u16,
    height: u16,
    pixels: Vec<u16>,
}

impl Raster {
    /// Create a blank raster
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; usize::from(width) * usize::from(height)],
        }
    }

    /// Blank 44x44 land raster
    pub fn land() -> Self {
        Self::new(LAND_SIZE, LAND_SIZE)
    }

    /// Build a raster from existing pixels, checking the buffer length
    pub fn from_pixels(width: u16, height: u16, pixels: Vec<u16>) -> FormatResult<Self> {
        let expected = usize::from(width) * usize::from(height);
        if pixels.len() != expected {
            return Err(FormatError::PixelCount {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether this raster has land tile dimensions
    pub const fn is_land_sized(&self) -> bool {
        self.width == LAND_SIZE && self.height == LAND_SIZE
    }

    /// All pixels, row-major
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Consume the raster, returning its pixel buffer
    pub fn into_pixels(self) -> Vec<u16> {
        self.pixels
    }

    /// Pixel at `(x, y)`, `None` outside the raster
    pub fn pixel(&self, x: u16, y: u16) -> Option<u16> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    /// Set the pixel at `(x, y)`; returns `false` outside the raster
    pub fn set_pixel(&mut self, x: u16, y: u16, value: u16) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.pixels[i] = value;
                true
            }
            None => false,
        }
    }

    /// One row of pixels
    pub fn row(&self, y: u16) -> Option<&[u16]> {
        if y >= self.height {
            return None;
        }
        let start = usize::from(y) * usize::from(self.width);
        Some(&self.pixels[start..start + usize::from(self.width)])
    }

    pub(crate) fn row_mut(&mut self, y: usize) -> &mut [u16] {
        let width = usize::from(self.width);
        let start = y * width;
        &mut self.pixels[start..start + width]
    }

    /// Whether no cell carries a pixel
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&p| p == 0)
    }

    /// Number of non-zero cells
    pub fn opaque_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p != 0).count()
    }

    /// Canonical byte form used for content digests:
    /// width u16 LE, height u16 LE, then every pixel u16 LE
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.pixels.len() * 2);
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        for pixel in &self.pixels {
            out.extend_from_slice(&pixel.to_le_bytes());
        }
        out
    }

    fn offset(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }
}
