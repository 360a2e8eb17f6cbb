//! Static (item) tile codec
//!
//! Layout, in little-endian 16-bit words:
//!
//! ```text
//! [reserved u32 = 1234] [width] [height] [row lookup; height words] [row data]
//! ```
//!
//! Each lookup word is the row start relative to the first word after the
//! lookup table. A row is a list of `(x_offset, run_length)` pairs, each
//! followed by `run_length` pixels, and ends with a pair summing to zero.

use crate::codec::TileCodec;
use crate::error::{FormatError, FormatResult};
use crate::raster::{PRESENCE_BIT, Raster};

/// Reserved header value written by the encoder
pub const STATIC_HEADER: u32 = 1234;

const HEADER_WORDS: usize = 4;

/// Largest raster, in cells, the decoder will allocate
pub const MAX_STATIC_AREA: usize = 1 << 24;

/// Codec for variable-size run-length static tiles
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCodec;

/// Read the declared `(width, height)` without decoding the tile
pub fn static_dimensions(data: &[u8]) -> Option<(u16, u16)> {
    if data.len() < HEADER_WORDS * 2 {
        return None;
    }
    let width = u16::from_le_bytes([data[4], data[5]]);
    let height = u16::from_le_bytes([data[6], data[7]]);
    Some((width, height))
}

struct Words<'a> {
    data: &'a [u8],
}

impl Words<'_> {
    const fn len(&self) -> usize {
        self.data.len() / 2
    }

    fn get(&self, index: usize) -> FormatResult<u16> {
        let at = index * 2;
        match self.data.get(at..at + 2) {
            Some(pair) => Ok(u16::from_le_bytes([pair[0], pair[1]])),
            None => Err(FormatError::Truncated {
                needed: at + 2,
                available: self.data.len(),
            }),
        }
    }
}

/// Encoded length of one row in words, terminator included
fn row_words(row: &[u16]) -> usize {
    let mut words = 2;
    let mut x = 0usize;
    while x < row.len() {
        if row[x] == 0 {
            x += 1;
            continue;
        }
        let run_start = x;
        while x < row.len() && row[x] != 0 {
            x += 1;
        }
        words += 2 + (x - run_start);
    }
    words
}

impl StaticCodec {
    /// Check that `raster` fits the static layout without encoding it
    ///
    /// Fails when the raster is empty or when a row would start past the
    /// reach of the 16-bit lookup table.
    pub fn check_encodable(raster: &Raster) -> FormatResult<()> {
        let (width, height) = (raster.width(), raster.height());
        if width == 0 || height == 0 {
            return Err(FormatError::InvalidDimensions { width, height });
        }

        let mut start = 0usize;
        for y in 0..height {
            if start > usize::from(u16::MAX) {
                return Err(FormatError::RowOffsetOverflow {
                    row: usize::from(y),
                    offset: start,
                });
            }
            start += row_words(raster.row(y).unwrap_or_default());
        }
        Ok(())
    }
}

impl TileCodec for StaticCodec {
    fn decode(data: &[u8]) -> FormatResult<Raster> {
        let (width, height) = static_dimensions(data).ok_or(FormatError::Truncated {
            needed: HEADER_WORDS * 2,
            available: data.len(),
        })?;
        if width == 0 || height == 0 {
            return Err(FormatError::InvalidDimensions { width, height });
        }

        let words = Words { data };
        let base = HEADER_WORDS + usize::from(height);
        if words.len() < base {
            return Err(FormatError::Truncated {
                needed: base * 2,
                available: data.len(),
            });
        }

        if usize::from(width) * usize::from(height) > MAX_STATIC_AREA {
            return Err(FormatError::TileTooLarge { width, height });
        }

        let row_width = usize::from(width);
        let mut raster = Raster::new(width, height);
        for y in 0..usize::from(height) {
            let mut pos = base + usize::from(words.get(HEADER_WORDS + y)?);
            if pos > words.len() {
                return Err(FormatError::RowLookup { row: y, offset: pos });
            }

            let row = raster.row_mut(y);
            let mut x = 0usize;
            loop {
                let offset = usize::from(words.get(pos)?);
                let run = usize::from(words.get(pos + 1)?);
                pos += 2;
                if offset + run == 0 {
                    break;
                }
                x += offset;
                // runs past the right edge drop the remainder of the row
                if x + run > row_width {
                    break;
                }
                if pos + run > words.len() {
                    return Err(FormatError::Truncated {
                        needed: (pos + run) * 2,
                        available: data.len(),
                    });
                }
                for cell in &mut row[x..x + run] {
                    *cell = words.get(pos)? ^ PRESENCE_BIT;
                    pos += 1;
                }
                x += run;
            }
        }
        Ok(raster)
    }

    fn encode(raster: &Raster) -> FormatResult<Vec<u8>> {
        Self::check_encodable(raster)?;
        let (width, height) = (raster.width(), raster.height());

        let mut lookups: Vec<u16> = Vec::with_capacity(usize::from(height));
        let mut body: Vec<u16> = Vec::new();
        for y in 0..height {
            let start = body.len();
            let start_word = u16::try_from(start).map_err(|_| FormatError::RowOffsetOverflow {
                row: usize::from(y),
                offset: start,
            })?;
            lookups.push(start_word);

            let row = raster.row(y).unwrap_or_default();
            let mut x = 0usize;
            let mut run_end = 0usize;
            while x < row.len() {
                if row[x] == 0 {
                    x += 1;
                    continue;
                }
                let run_start = x;
                while x < row.len() && row[x] != 0 {
                    x += 1;
                }
                body.push((run_start - run_end) as u16);
                body.push((x - run_start) as u16);
                body.extend(row[run_start..x].iter().map(|&p| p ^ PRESENCE_BIT));
                run_end = x;
            }
            body.extend([0, 0]);
        }

        let mut out = Vec::with_capacity((HEADER_WORDS + lookups.len() + body.len()) * 2);
        out.extend_from_slice(&STATIC_HEADER.to_le_bytes());
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        for word in lookups.iter().chain(&body) {
            out.extend_from_slice(&word.to_le_bytes());
        }
        Ok(out)
    }
}
