//! Tile flag bits shared by land and item records

use binrw::{BinRead, BinWrite};
use std::fmt;

/// 32-bit flag word of a tiledata record
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[brw(little)]
pub struct TileFlags {
    /// Raw flag value
    pub value: u32,
}

impl TileFlags {
    /// No flags
    pub const NONE: u32 = 0;
    /// Drawn behind other tiles (bit 0)
    pub const BACKGROUND: u32 = 1 << 0;
    /// Weapon (bit 1)
    pub const WEAPON: u32 = 1 << 1;
    /// Transparent (bit 2)
    pub const TRANSPARENT: u32 = 1 << 2;
    /// Translucent (bit 3)
    pub const TRANSLUCENT: u32 = 1 << 3;
    /// Wall (bit 4)
    pub const WALL: u32 = 1 << 4;
    /// Inflicts damage (bit 5)
    pub const DAMAGING: u32 = 1 << 5;
    /// Blocks movement (bit 6)
    pub const IMPASSABLE: u32 = 1 << 6;
    /// Water (bit 7)
    pub const WET: u32 = 1 << 7;
    /// Unknown (bit 8)
    pub const UNKNOWN1: u32 = 1 << 8;
    /// Walkable surface (bit 9)
    pub const SURFACE: u32 = 1 << 9;
    /// Stair or ramp (bit 10)
    pub const BRIDGE: u32 = 1 << 10;
    /// Stackable (bit 11)
    pub const GENERIC: u32 = 1 << 11;
    /// Window (bit 12)
    pub const WINDOW: u32 = 1 << 12;
    /// Blocks line of sight (bit 13)
    pub const NO_SHOOT: u32 = 1 << 13;
    /// Name takes the article "a" (bit 14)
    pub const ARTICLE_A: u32 = 1 << 14;
    /// Name takes the article "an" (bit 15)
    pub const ARTICLE_AN: u32 = 1 << 15;
    /// Internal use (bit 16)
    pub const INTERNAL: u32 = 1 << 16;
    /// Foliage (bit 17)
    pub const FOLIAGE: u32 = 1 << 17;
    /// Only grey pixels take hue (bit 18)
    pub const PARTIAL_HUE: u32 = 1 << 18;
    /// Unknown (bit 19)
    pub const UNKNOWN2: u32 = 1 << 19;
    /// Map (bit 20)
    pub const MAP: u32 = 1 << 20;
    /// Container (bit 21)
    pub const CONTAINER: u32 = 1 << 21;
    /// Wearable (bit 22)
    pub const WEARABLE: u32 = 1 << 22;
    /// Emits light (bit 23)
    pub const LIGHT_SOURCE: u32 = 1 << 23;
    /// Animated (bit 24)
    pub const ANIMATION: u32 = 1 << 24;
    /// Hover-over (bit 25)
    pub const HOVER_OVER: u32 = 1 << 25;
    /// Unknown (bit 26)
    pub const UNKNOWN3: u32 = 1 << 26;
    /// Armor (bit 27)
    pub const ARMOR: u32 = 1 << 27;
    /// Roof (bit 28)
    pub const ROOF: u32 = 1 << 28;
    /// Door (bit 29)
    pub const DOOR: u32 = 1 << 29;
    /// Stair facing back (bit 30)
    pub const STAIR_BACK: u32 = 1 << 30;
    /// Stair facing right (bit 31)
    pub const STAIR_RIGHT: u32 = 1 << 31;

    /// Text column names of every flag, in bit order
    pub const COLUMNS: [&str; 32] = [
        "Background",
        "Weapon",
        "Transparent",
        "Translucent",
        "Wall",
        "Damage",
        "Impassible",
        "Wet",
        "Unknow1",
        "Surface",
        "Bridge",
        "Generic",
        "Window",
        "NoShoot",
        "PrefixA",
        "PrefixAn",
        "Internal",
        "Foliage",
        "PartialHue",
        "Unknow2",
        "Map",
        "Container/Height",
        "Wearable",
        "Lightsource",
        "Animation",
        "HoverOver",
        "Unknow3",
        "Armor",
        "Roof",
        "Door",
        "StairBack",
        "StairRight",
    ];

    /// Create flags from a raw value
    pub const fn new(value: u32) -> Self {
        Self { value }
    }

    /// Check if flag is set
    pub const fn has(&self, flag: u32) -> bool {
        (self.value & flag) != 0
    }

    /// Set flag
    pub fn set(&mut self, flag: u32) {
        self.value |= flag;
    }

    /// Clear flag
    pub fn clear(&mut self, flag: u32) {
        self.value &= !flag;
    }

    /// Whether bit `bit` (0-31) is set
    pub const fn bit(&self, bit: u32) -> bool {
        bit < 32 && self.has(1 << bit)
    }

    /// Set or clear bit `bit` (0-31)
    pub fn set_bit(&mut self, bit: u32, on: bool) {
        if bit >= 32 {
            return;
        }
        if on {
            self.set(1 << bit);
        } else {
            self.clear(1 << bit);
        }
    }

    /// Names of the set flags
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        (0..32u32)
            .filter(|&bit| self.bit(bit))
            .map(|bit| Self::COLUMNS[bit as usize])
    }
}

impl From<u32> for TileFlags {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for TileFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.names().collect();
        if names.is_empty() {
            write!(f, "None")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}
