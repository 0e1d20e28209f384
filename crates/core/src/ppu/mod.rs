//! Reusable video components for tile-based Sega hardware.
//!
//! The Genesis VDP model in `mdflip_genesis` builds on these pieces; they are
//! kept here so they can be tested without any plane or VRAM state.

pub mod palette;
pub mod tile;

pub use palette::{genesis_to_argb, IndexedPalette, RamPalette};
pub use tile::{words_to_bytes, Genesis4BppDecoder, TileDecoder, TILE_BYTES, TILE_WORDS};
