//! Sega Genesis / Mega Drive background helpers
//!
//! This crate implements a horizontally mirrored image blit for the Genesis
//! VDP, together with the in-memory VDP it writes to.
//!
//! # Architecture
//!
//! - **VRAM**: 64 KB, 2048 tiles of 8x8 pixels at 4 bits per pixel
//! - **Planes**: A, B and Window name tables of 16-bit tile attributes
//! - **CRAM**: 4 palettes of 16 colours (9-bit BGR)
//!
//! The blit only talks to [`TileUploader`] and [`TileMapWriter`], so any
//! other target (a recording fake, a real VDP port) can stand in for [`Vdp`].

mod attr;
mod blit;
mod error;
mod image;
mod vdp;

pub use attr::TileAttribute;
pub use blit::{
    draw_image, draw_image_flipped_h, BlitOutcome, MirroredTileBlit, PlacementRequest, SkipReason,
};
pub use error::GenesisError;
pub use image::{ImageAsset, ImagePalette, TileMap, TileSet};
pub use vdp::{
    Plane, TileMapWriter, TileUploader, TransferMode, TransferStats, Vdp, SCREEN_HEIGHT,
    SCREEN_WIDTH, VRAM_SIZE, VRAM_TILES,
};
