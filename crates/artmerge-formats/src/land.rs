//! Land tile codec
//!
//! Land tiles are 44x44 diamonds stored as 1012 little-endian pixels. The
//! top half widens by two pixels per row from a 2-pixel run at x = 21; the
//! bottom half narrows back the same way.

use crate::codec::TileCodec;
use crate::error::{FormatError, FormatResult};
use crate::raster::{LAND_SIZE, PRESENCE_BIT, Raster};

/// Pixels in one encoded land tile
pub const LAND_PIXELS: usize = 1012;

/// Encoded size of one land tile in bytes
pub const LAND_ENCODED_SIZE: usize = LAND_PIXELS * 2;

const HALF: usize = LAND_SIZE as usize / 2;

/// Codec for the fixed 44x44 diamond layout
#[derive(Debug, Clone, Copy, Default)]
pub struct LandCodec;

/// Left offset and run length of every diamond row
fn diamond_rows() -> impl Iterator<Item = (usize, usize, usize)> {
    (0..LAND_SIZE as usize).map(|y| {
        if y < HALF {
            (y, HALF - 1 - y, 2 + 2 * y)
        } else {
            let i = y - HALF;
            (y, i, LAND_SIZE as usize - 2 * i)
        }
    })
}

impl TileCodec for LandCodec {
    fn decode(data: &[u8]) -> FormatResult<Raster> {
        if data.len() < LAND_ENCODED_SIZE {
            return Err(FormatError::Truncated {
                needed: LAND_ENCODED_SIZE,
                available: data.len(),
            });
        }

        let mut raster = Raster::land();
        let mut words = data
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
        for (y, offset, run) in diamond_rows() {
            let row = raster.row_mut(y);
            for cell in &mut row[offset..offset + run] {
                // length checked above, the iterator cannot run dry
                *cell = words.next().unwrap_or(0) | PRESENCE_BIT;
            }
        }
        Ok(raster)
    }

    fn encode(raster: &Raster) -> FormatResult<Vec<u8>> {
        if !raster.is_land_sized() {
            return Err(FormatError::LandDimensions {
                width: raster.width(),
                height: raster.height(),
            });
        }

        let width = usize::from(LAND_SIZE);
        let pixels = raster.pixels();
        let mut out = Vec::with_capacity(LAND_ENCODED_SIZE);
        for (y, offset, run) in diamond_rows() {
            let start = y * width + offset;
            for &pixel in &pixels[start..start + run] {
                out.extend_from_slice(&(pixel ^ PRESENCE_BIT).to_le_bytes());
            }
        }
        Ok(out)
    }
}
