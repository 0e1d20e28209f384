//! Compiled image assets: tile patterns, a tilemap of relative indices and an
//! optional palette.
//!
//! Assets are normally produced by an external resource compiler. On the host
//! they are read from JSON:
//!
//! ```json
//! {
//!   "tileset": { "tiles": [287454020, 0, 0, 0, 0, 0, 0, 0] },
//!   "tilemap": { "w": 2, "h": 1, "tilemap": [0, 0] },
//!   "palette": [0, 3822]
//! }
//! ```
//!
//! Every part is optional; the blit skips images lacking tiles or a tilemap.

use crate::error::GenesisError;
use mdflip_core::logging::{log, LogCategory, LogLevel};
use mdflip_core::ppu::TILE_WORDS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Raw 4bpp tile patterns, eight row words per tile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawTileSet")]
pub struct TileSet {
    tiles: Vec<u32>,
}

#[derive(Deserialize)]
struct RawTileSet {
    tiles: Vec<u32>,
}

impl TileSet {
    pub fn new(tiles: Vec<u32>) -> Result<Self, GenesisError> {
        if tiles.len() % TILE_WORDS != 0 {
            return Err(GenesisError::InvalidAsset(format!(
                "tileset holds {} words, not a multiple of {}",
                tiles.len(),
                TILE_WORDS
            )));
        }
        Ok(Self { tiles })
    }

    pub fn num_tiles(&self) -> usize {
        self.tiles.len() / TILE_WORDS
    }

    pub fn words(&self) -> &[u32] {
        &self.tiles
    }

    /// Row words of tile `index`.
    pub fn tile(&self, index: usize) -> Option<&[u32]> {
        let start = index.checked_mul(TILE_WORDS)?;
        let end = start.checked_add(TILE_WORDS)?;
        self.tiles.get(start..end)
    }
}

impl TryFrom<RawTileSet> for TileSet {
    type Error = GenesisError;

    fn try_from(raw: RawTileSet) -> Result<Self, Self::Error> {
        TileSet::new(raw.tiles)
    }
}

/// Row-major grid of tile indices relative to the image's own tile block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTileMap")]
pub struct TileMap {
    w: u16,
    h: u16,
    tilemap: Vec<u16>,
}

#[derive(Deserialize)]
struct RawTileMap {
    w: u16,
    h: u16,
    tilemap: Vec<u16>,
}

impl TileMap {
    pub fn new(w: u16, h: u16, tilemap: Vec<u16>) -> Result<Self, GenesisError> {
        let expected = w as usize * h as usize;
        if tilemap.len() != expected {
            return Err(GenesisError::InvalidAsset(format!(
                "tilemap is {}x{} but holds {} entries",
                w,
                h,
                tilemap.len()
            )));
        }
        Ok(Self { w, h, tilemap })
    }

    /// Width in tiles.
    pub fn w(&self) -> u16 {
        self.w
    }

    /// Height in tiles.
    pub fn h(&self) -> u16 {
        self.h
    }

    pub fn entries(&self) -> &[u16] {
        &self.tilemap
    }

    /// Relative tile index at column `col`, row `row`.
    pub fn get(&self, col: u16, row: u16) -> Option<u16> {
        if col >= self.w || row >= self.h {
            return None;
        }
        self.tilemap
            .get(row as usize * self.w as usize + col as usize)
            .copied()
    }
}

impl TryFrom<RawTileMap> for TileMap {
    type Error = GenesisError;

    fn try_from(raw: RawTileMap) -> Result<Self, Self::Error> {
        TileMap::new(raw.w, raw.h, raw.tilemap)
    }
}

/// Up to 16 CRAM words (`0000BBB0GGG0RRR0`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u16>", into = "Vec<u16>")]
pub struct ImagePalette(Vec<u16>);

impl ImagePalette {
    pub const MAX_COLORS: usize = 16;

    pub fn new(colors: Vec<u16>) -> Result<Self, GenesisError> {
        if colors.len() > Self::MAX_COLORS {
            return Err(GenesisError::InvalidPalette(format!(
                "{} colours, at most {} fit a palette line",
                colors.len(),
                Self::MAX_COLORS
            )));
        }
        Ok(Self(colors))
    }

    pub fn colors(&self) -> &[u16] {
        &self.0
    }
}

impl TryFrom<Vec<u16>> for ImagePalette {
    type Error = GenesisError;

    fn try_from(colors: Vec<u16>) -> Result<Self, Self::Error> {
        ImagePalette::new(colors)
    }
}

impl From<ImagePalette> for Vec<u16> {
    fn from(palette: ImagePalette) -> Self {
        palette.0
    }
}

/// A compiled image: what the blit reads, never modifies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageAsset {
    #[serde(default)]
    pub tileset: Option<TileSet>,
    #[serde(default)]
    pub tilemap: Option<TileMap>,
    #[serde(default)]
    pub palette: Option<ImagePalette>,
}

impl ImageAsset {
    pub fn new(tileset: TileSet, tilemap: TileMap) -> Self {
        Self {
            tileset: Some(tileset),
            tilemap: Some(tilemap),
            palette: None,
        }
    }

    #[must_use]
    pub fn with_palette(mut self, palette: ImagePalette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, GenesisError> {
        let asset: ImageAsset = serde_json::from_str(json)?;
        asset.check_references();
        Ok(asset)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GenesisError> {
        let path = path.as_ref();
        log(LogCategory::Asset, LogLevel::Info, || {
            format!("Asset: loading {}", path.display())
        });
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Warn about tilemap entries pointing past the image's own tiles.
    ///
    /// Such entries are legal (they may reference tiles uploaded elsewhere) so
    /// this never rejects the asset.
    fn check_references(&self) {
        if let (Some(tileset), Some(tilemap)) = (&self.tileset, &self.tilemap) {
            let num_tiles = tileset.num_tiles();
            let outside = tilemap
                .entries()
                .iter()
                .filter(|&&rel| rel as usize >= num_tiles)
                .count();
            if outside > 0 {
                log(LogCategory::Asset, LogLevel::Warn, || {
                    format!(
                        "Asset: {} tilemap entries reference tiles beyond the {} in the tileset",
                        outside, num_tiles
                    )
                });
            }
        }
    }
}
