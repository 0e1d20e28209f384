//! Packed plane cell attributes.
//!
//! Every name table cell is one 16-bit word:
//!
//! ```text
//! 15  14 13  12  11  10 ........ 0
//! PRI  PAL   VF  HF  tile index
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

const PRIORITY: u16 = 0x8000;
const PALETTE_SHIFT: u16 = 13;
const PALETTE_MASK: u16 = 0x6000;
const VFLIP: u16 = 0x1000;
const HFLIP: u16 = 0x0800;
const INDEX_MASK: u16 = 0x07FF;

/// One plane cell: tile index plus rendering attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileAttribute(u16);

impl TileAttribute {
    /// Highest tile index a cell can address.
    pub const MAX_TILE_INDEX: u16 = INDEX_MASK;

    /// Build an attribute; `palette` keeps its low 2 bits, `tile_index` its low 11.
    pub const fn new(palette: u8, priority: bool, vflip: bool, hflip: bool, tile_index: u16) -> Self {
        Self(
            (tile_index & INDEX_MASK)
                | ((hflip as u16) << 11)
                | ((vflip as u16) << 12)
                | (((palette as u16) << PALETTE_SHIFT) & PALETTE_MASK)
                | ((priority as u16) << 15),
        )
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn tile_index(self) -> u16 {
        self.0 & INDEX_MASK
    }

    pub const fn palette(self) -> u8 {
        ((self.0 & PALETTE_MASK) >> PALETTE_SHIFT) as u8
    }

    pub const fn priority(self) -> bool {
        self.0 & PRIORITY != 0
    }

    pub const fn hflip(self) -> bool {
        self.0 & HFLIP != 0
    }

    pub const fn vflip(self) -> bool {
        self.0 & VFLIP != 0
    }

    #[must_use]
    pub const fn with_tile_index(self, tile_index: u16) -> Self {
        Self((self.0 & !INDEX_MASK) | (tile_index & INDEX_MASK))
    }

    #[must_use]
    pub const fn with_hflip(self, hflip: bool) -> Self {
        Self((self.0 & !HFLIP) | ((hflip as u16) << 11))
    }

    #[must_use]
    pub const fn with_vflip(self, vflip: bool) -> Self {
        Self((self.0 & !VFLIP) | ((vflip as u16) << 12))
    }
}

impl From<TileAttribute> for u16 {
    fn from(attr: TileAttribute) -> Self {
        attr.0
    }
}

impl fmt::Display for TileAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04X} (tile {}, pal {}{}{}{})",
            self.0,
            self.tile_index(),
            self.palette(),
            if self.priority() { ", pri" } else { "" },
            if self.hflip() { ", hflip" } else { "" },
            if self.vflip() { ", vflip" } else { "" },
        )
    }
}
