//! Land and item tiledata records

use binrw::{BinRead, BinWrite};
use encoding_rs::WINDOWS_1252;

use super::flags::TileFlags;

/// Width of the fixed name field
pub const NAME_LEN: usize = 20;

/// Fixed 20-byte, zero-padded Windows-1252 tile name
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileName(pub [u8; NAME_LEN]);

impl TileName {
    /// Encode `name`, truncating to 20 bytes and replacing unmappable characters with `?`
    pub fn encode(name: &str) -> Self {
        let mut bytes = [0u8; NAME_LEN];
        let mut len = 0;
        let mut buf = [0u8; 4];
        for ch in name.chars() {
            if len == NAME_LEN {
                break;
            }
            let (encoded, _, had_errors) = WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
            bytes[len] = if had_errors || encoded.len() != 1 {
                b'?'
            } else {
                encoded[0]
            };
            len += 1;
        }
        Self(bytes)
    }

    /// Decoded name up to the first zero byte
    pub fn decode(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(&self.0[..end]);
        decoded.into_owned()
    }

    /// Replace the name, keeping the raw bytes when the text is unchanged
    pub fn set(&mut self, name: &str) {
        if self.decode() != name {
            *self = Self::encode(name);
        }
    }

    /// Raw field bytes
    pub const fn as_bytes(&self) -> &[u8; NAME_LEN] {
        &self.0
    }
}

/// Land tile record
///
/// The `extra` field exists only in the extended layout, where it follows
/// the flags.
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq, Default)]
#[brw(little)]
#[br(import(extended: bool))]
pub struct LandRecord {
    /// Tile flags
    pub flags: TileFlags,
    /// Extended-layout extra field
    #[br(if(extended))]
    pub extra: Option<i32>,
    /// Texture id
    pub texture_id: u16,
    /// Tile name
    pub name: TileName,
}

impl LandRecord {
    /// Record size in the legacy layout
    pub const LEGACY_SIZE: usize = 26;
    /// Record size in the extended layout
    pub const EXTENDED_SIZE: usize = 30;

    /// Decoded name
    pub fn name(&self) -> String {
        self.name.decode()
    }

    /// Set the name
    pub fn set_name(&mut self, name: &str) {
        self.name.set(name);
    }
}

/// Item (static) tile record
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq, Default)]
#[brw(little)]
#[br(import(extended: bool))]
pub struct ItemRecord {
    /// Tile flags
    pub flags: TileFlags,
    /// Extended-layout extra field
    #[br(if(extended))]
    pub extra: Option<i32>,
    /// Weight, or quantity for stackables
    pub weight: u8,
    /// Quality, or layer for wearables
    pub quality: u8,
    /// Miscellaneous data
    pub misc_data: i16,
    /// Unknown
    pub unknown2: u8,
    /// Quantity, or class
    pub quantity: u8,
    /// Animation (gump) id
    pub animation: u16,
    /// Unknown
    pub unknown3: u8,
    /// Hue
    pub hue: u8,
    /// Stacking offset
    pub stacking_offset: u8,
    /// Value
    pub value: u8,
    /// Height, or capacity for containers
    pub height: u8,
    /// Tile name
    pub name: TileName,
}

impl ItemRecord {
    /// Record size in the legacy layout
    pub const LEGACY_SIZE: usize = 37;
    /// Record size in the extended layout
    pub const EXTENDED_SIZE: usize = 41;

    /// Decoded name
    pub fn name(&self) -> String {
        self.name.decode()
    }

    /// Set the name
    pub fn set_name(&mut self, name: &str) {
        self.name.set(name);
    }
}
