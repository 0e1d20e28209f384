//! Genesis Video Display Processor (VDP) memories
//!
//! Only the parts a background blit touches are modelled: VRAM, the three
//! plane name tables and CRAM. Addressing wraps the way the VDP's address
//! decoder does, so out-of-range tile indices and cell coordinates alias
//! instead of failing.
//!
//! # Features
//! - 320×224 (H40) preview composition of planes B and A
//! - Per-cell priority, palette and flip attributes
//! - Transfer statistics per upload mode
//! - JSON save states

use crate::attr::TileAttribute;
use crate::error::GenesisError;
use crate::image::TileSet;
use mdflip_core::logging::{log, LogCategory, LogLevel};
use mdflip_core::ppu::{
    genesis_to_argb, words_to_bytes, Genesis4BppDecoder, IndexedPalette, RamPalette, TileDecoder,
    TILE_BYTES,
};
use mdflip_core::renderer::Renderer;
use mdflip_core::types::Frame;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// VRAM size in bytes (64 KB)
pub const VRAM_SIZE: usize = 0x10000;
/// Number of tiles VRAM can hold
pub const VRAM_TILES: usize = VRAM_SIZE / TILE_BYTES;
/// Visible width in H40 mode
pub const SCREEN_WIDTH: u32 = 320;
/// Visible height in V28 mode
pub const SCREEN_HEIGHT: u32 = 224;

const CRAM_ENTRIES: usize = 64;
const WINDOW_WIDTH: u16 = 64;
const WINDOW_HEIGHT: u16 = 32;

/// Background plane selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plane {
    A,
    B,
    Window,
}

impl FromStr for Plane {
    type Err = GenesisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a" | "bg_a" => Ok(Plane::A),
            "b" | "bg_b" => Ok(Plane::B),
            "w" | "window" => Ok(Plane::Window),
            _ => Err(GenesisError::UnknownPlane(s.to_string())),
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plane::A => write!(f, "BG_A"),
            Plane::B => write!(f, "BG_B"),
            Plane::Window => write!(f, "WINDOW"),
        }
    }
}

/// How tile data reaches VRAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferMode {
    /// Word-by-word writes through the data port
    Cpu,
    /// Immediate DMA from 68000 memory
    Dma,
    /// DMA deferred to the next vertical blank
    DmaQueue,
}

/// Copies tile patterns into tile memory.
pub trait TileUploader {
    /// Copy every tile of `tileset` into VRAM starting at tile `index`.
    fn upload(&mut self, tileset: &TileSet, index: u16, mode: TransferMode);
}

/// Writes cells of a plane's name table.
pub trait TileMapWriter {
    /// Write `attr` at cell `(x, y)` of `plane`.
    fn set_cell(&mut self, plane: Plane, attr: TileAttribute, x: u16, y: u16);
}

/// Counters for uploads seen by the VDP
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStats {
    pub cpu: u32,
    pub dma: u32,
    pub dma_queue: u32,
    pub tiles: u64,
}

/// One name table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PlaneTable {
    width: u16,
    height: u16,
    cells: Vec<u16>,
}

impl PlaneTable {
    fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width as usize * height as usize],
        }
    }

    fn offset(&self, x: u16, y: u16) -> usize {
        (y % self.height) as usize * self.width as usize + (x % self.width) as usize
    }

    fn get(&self, x: u16, y: u16) -> TileAttribute {
        TileAttribute::from_bits(self.cells[self.offset(x, y)])
    }

    fn set(&mut self, x: u16, y: u16, attr: TileAttribute) {
        let offset = self.offset(x, y);
        self.cells[offset] = attr.bits();
    }

    fn clear(&mut self) {
        self.cells.fill(0);
    }
}

/// Scroll plane dimensions: 32, 64 or 128 cells per side, at most 4096 cells
fn check_plane_size(width: u16, height: u16) -> Result<(), GenesisError> {
    let valid = |d: u16| matches!(d, 32 | 64 | 128);
    if !valid(width) || !valid(height) || width as usize * height as usize > 4096 {
        return Err(GenesisError::InvalidPlaneSize { width, height });
    }
    Ok(())
}

/// Serialized VDP contents
#[derive(Serialize, Deserialize)]
struct VdpState {
    vram: Vec<u8>,
    cram: Vec<u16>,
    plane_a: PlaneTable,
    plane_b: PlaneTable,
    window: PlaneTable,
    backdrop: u8,
    stats: TransferStats,
}

/// VDP memories and preview renderer
pub struct Vdp {
    vram: Vec<u8>,

    // Raw CRAM words and their decoded colours
    cram: [u16; CRAM_ENTRIES],
    colors: RamPalette,

    plane_a: PlaneTable,
    plane_b: PlaneTable,
    window: PlaneTable,

    // CRAM index of the background colour (register 7)
    backdrop: u8,

    stats: TransferStats,
    frame: Frame,
}

impl Vdp {
    /// Create a VDP with 64×32 scroll planes
    pub fn new() -> Self {
        Self {
            vram: vec![0; VRAM_SIZE],
            cram: [0; CRAM_ENTRIES],
            colors: RamPalette::new(CRAM_ENTRIES),
            plane_a: PlaneTable::new(64, 32),
            plane_b: PlaneTable::new(64, 32),
            window: PlaneTable::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            backdrop: 0,
            stats: TransferStats::default(),
            frame: Frame::new(SCREEN_WIDTH, SCREEN_HEIGHT),
        }
    }

    /// Create a VDP with a custom scroll plane size.
    ///
    /// Each dimension is 32, 64 or 128 cells and a plane holds at most 4096
    /// cells (register 16).
    pub fn with_plane_size(width: u16, height: u16) -> Result<Self, GenesisError> {
        check_plane_size(width, height)?;

        let mut vdp = Self::new();
        vdp.plane_a = PlaneTable::new(width, height);
        vdp.plane_b = PlaneTable::new(width, height);
        Ok(vdp)
    }

    /// Size in cells of `plane`
    pub fn plane_size(&self, plane: Plane) -> (u16, u16) {
        let table = self.table(plane);
        (table.width, table.height)
    }

    /// Cell attribute at `(x, y)`, with the same wrapping as writes
    pub fn tile_attr(&self, plane: Plane, x: u16, y: u16) -> TileAttribute {
        self.table(plane).get(x, y)
    }

    /// Pattern bytes of VRAM tile `index`
    pub fn tile_data(&self, index: u16) -> &[u8] {
        let start = (index as usize % VRAM_TILES) * TILE_BYTES;
        &self.vram[start..start + TILE_BYTES]
    }

    pub fn vram(&self) -> &[u8] {
        &self.vram
    }

    pub fn stats(&self) -> TransferStats {
        self.stats
    }

    /// Load up to 16 colours into palette line `index` (0-3)
    pub fn load_palette(&mut self, index: u8, colors: &[u16]) -> Result<(), GenesisError> {
        if index > 3 {
            return Err(GenesisError::InvalidPalette(format!(
                "palette line {} does not exist",
                index
            )));
        }
        if colors.len() > 16 {
            return Err(GenesisError::InvalidPalette(format!(
                "{} colours do not fit a palette line",
                colors.len()
            )));
        }

        let base = index as usize * 16;
        for (i, &color) in colors.iter().enumerate() {
            self.cram[base + i] = color;
            self.colors.set_color(base + i, genesis_to_argb(color));
        }
        Ok(())
    }

    /// Raw CRAM word at `index` (0-63)
    pub fn cram(&self, index: usize) -> Option<u16> {
        self.cram.get(index).copied()
    }

    /// Select the background colour from palette line `palette`, entry `index`
    pub fn set_backdrop(&mut self, palette: u8, index: u8) {
        self.backdrop = ((palette & 3) << 4) | (index & 0xF);
    }

    fn table(&self, plane: Plane) -> &PlaneTable {
        match plane {
            Plane::A => &self.plane_a,
            Plane::B => &self.plane_b,
            Plane::Window => &self.window,
        }
    }

    fn table_mut(&mut self, plane: Plane) -> &mut PlaneTable {
        match plane {
            Plane::A => &mut self.plane_a,
            Plane::B => &mut self.plane_b,
            Plane::Window => &mut self.window,
        }
    }

    /// Draw the visible cells of one plane with the given priority
    fn compose_plane(&mut self, plane: Plane, priority: bool) {
        let decoder = Genesis4BppDecoder;
        let cols = SCREEN_WIDTH as u16 / 8;
        let rows = SCREEN_HEIGHT as u16 / 8;

        for cy in 0..rows {
            for cx in 0..cols {
                let attr = self.table(plane).get(cx, cy);
                if attr.priority() != priority {
                    continue;
                }

                let mut tile = [0u8; TILE_BYTES];
                tile.copy_from_slice(self.tile_data(attr.tile_index()));
                let palette_base = attr.palette() as usize * 16;

                for py in 0..8u8 {
                    let sy = if attr.vflip() { 7 - py } else { py };
                    for px in 0..8u8 {
                        let sx = if attr.hflip() { 7 - px } else { px };
                        let pixel = decoder.decode_pixel(&tile, sx, sy);

                        // Colour 0 is transparent
                        if pixel != 0 {
                            let x = cx as usize * 8 + px as usize;
                            let y = cy as usize * 8 + py as usize;
                            self.frame.pixels[y * SCREEN_WIDTH as usize + x] =
                                self.colors.get_color(palette_base + pixel as usize);
                        }
                    }
                }
            }
        }
    }

    /// Return a JSON snapshot of VRAM, CRAM, planes and statistics
    pub fn save_state(&self) -> Value {
        let state = VdpState {
            vram: self.vram.clone(),
            cram: self.cram.to_vec(),
            plane_a: self.plane_a.clone(),
            plane_b: self.plane_b.clone(),
            window: self.window.clone(),
            backdrop: self.backdrop,
            stats: self.stats,
        };
        serde_json::to_value(state).unwrap_or(Value::Null)
    }

    /// Restore a snapshot produced by [`Vdp::save_state`]
    pub fn load_state(&mut self, v: &Value) -> Result<(), GenesisError> {
        let state: VdpState = serde_json::from_value(v.clone())?;
        if state.vram.len() != VRAM_SIZE || state.cram.len() != CRAM_ENTRIES {
            return Err(GenesisError::InvalidAsset(
                "save state memory sizes do not match the VDP".to_string(),
            ));
        }
        // A and B share one size register; the window is fixed
        let (width, height) = (state.plane_a.width, state.plane_a.height);
        check_plane_size(width, height)?;
        if (state.plane_b.width, state.plane_b.height) != (width, height) {
            return Err(GenesisError::InvalidPlaneSize {
                width: state.plane_b.width,
                height: state.plane_b.height,
            });
        }
        if (state.window.width, state.window.height) != (WINDOW_WIDTH, WINDOW_HEIGHT) {
            return Err(GenesisError::InvalidPlaneSize {
                width: state.window.width,
                height: state.window.height,
            });
        }
        for table in [&state.plane_a, &state.plane_b, &state.window] {
            if table.cells.len() != table.width as usize * table.height as usize {
                return Err(GenesisError::InvalidPlaneSize {
                    width: table.width,
                    height: table.height,
                });
            }
        }

        self.vram = state.vram;
        for (i, &color) in state.cram.iter().enumerate() {
            self.cram[i] = color;
            self.colors.set_color(i, genesis_to_argb(color));
        }
        self.plane_a = state.plane_a;
        self.plane_b = state.plane_b;
        self.window = state.window;
        self.backdrop = state.backdrop;
        self.stats = state.stats;
        Ok(())
    }
}

impl Default for Vdp {
    fn default() -> Self {
        Self::new()
    }
}

impl TileUploader for Vdp {
    fn upload(&mut self, tileset: &TileSet, index: u16, mode: TransferMode) {
        let bytes = words_to_bytes(tileset.words());
        let start = (index as usize % VRAM_TILES) * TILE_BYTES;

        if start + bytes.len() > VRAM_SIZE {
            log(LogCategory::Vram, LogLevel::Warn, || {
                format!(
                    "VRAM: {} tiles at index {} run past the end of VRAM and wrap",
                    tileset.num_tiles(),
                    index
                )
            });
        }
        for (i, byte) in bytes.into_iter().enumerate() {
            self.vram[(start + i) % VRAM_SIZE] = byte;
        }

        match mode {
            TransferMode::Cpu => self.stats.cpu += 1,
            TransferMode::Dma => self.stats.dma += 1,
            TransferMode::DmaQueue => self.stats.dma_queue += 1,
        }
        self.stats.tiles += tileset.num_tiles() as u64;

        log(LogCategory::Dma, LogLevel::Debug, || {
            format!(
                "DMA: {:?} upload of {} tiles to index {}",
                mode,
                tileset.num_tiles(),
                index
            )
        });
    }
}

impl TileMapWriter for Vdp {
    fn set_cell(&mut self, plane: Plane, attr: TileAttribute, x: u16, y: u16) {
        let table = self.table_mut(plane);
        if x >= table.width || y >= table.height {
            let (width, height) = (table.width, table.height);
            log(LogCategory::Plane, LogLevel::Debug, || {
                format!(
                    "Plane {}: cell ({}, {}) outside {}x{}, wrapping",
                    plane, x, y, width, height
                )
            });
        }
        table.set(x, y, attr);

        log(LogCategory::Plane, LogLevel::Trace, || {
            format!("Plane {}: ({}, {}) = {}", plane, x, y, attr)
        });
    }
}

impl Renderer for Vdp {
    fn get_frame(&self) -> &Frame {
        &self.frame
    }

    fn render(&mut self) {
        let backdrop = self.colors.get_color(self.backdrop as usize);
        self.clear(backdrop);

        // Low priority layers first, plane B beneath plane A
        for priority in [false, true] {
            self.compose_plane(Plane::B, priority);
            self.compose_plane(Plane::A, priority);
        }
    }

    fn clear(&mut self, color: u32) {
        self.frame.pixels.fill(color);
    }

    fn reset(&mut self) {
        self.vram.fill(0);
        self.cram.fill(0);
        self.colors.clear();
        self.plane_a.clear();
        self.plane_b.clear();
        self.window.clear();
        self.backdrop = 0;
        self.stats = TransferStats::default();
        self.clear(0xFF000000);
    }

    fn name(&self) -> &str {
        "Genesis VDP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_tile(color: u8) -> Vec<u32> {
        let nibble = (color & 0xF) as u32;
        vec![nibble * 0x1111_1111; 8]
    }

    #[test]
    fn test_vdp_creation() {
        let vdp = Vdp::new();
        assert_eq!(vdp.vram().len(), VRAM_SIZE);
        assert_eq!(vdp.plane_size(Plane::A), (64, 32));
        assert_eq!(vdp.plane_size(Plane::Window), (64, 32));
        assert_eq!(vdp.get_frame().pixels.len(), 320 * 224);
        assert_eq!(vdp.name(), "Genesis VDP");
    }

    #[test]
    fn test_plane_parsing() {
        assert_eq!("BG_A".parse::<Plane>().unwrap(), Plane::A);
        assert_eq!("b".parse::<Plane>().unwrap(), Plane::B);
        assert_eq!("window".parse::<Plane>().unwrap(), Plane::Window);
        assert!(matches!(
            "c".parse::<Plane>(),
            Err(GenesisError::UnknownPlane(_))
        ));
    }

    #[test]
    fn test_plane_size_validation() {
        assert_eq!(
            Vdp::with_plane_size(128, 32).unwrap().plane_size(Plane::B),
            (128, 32)
        );
        assert!(Vdp::with_plane_size(128, 64).is_err());
        assert!(Vdp::with_plane_size(40, 32).is_err());
    }

    #[test]
    fn test_upload_writes_big_endian_patterns() {
        let mut vdp = Vdp::new();
        let mut words = vec![0u32; 8];
        words[0] = 0x1234_5678;
        let tileset = TileSet::new(words).unwrap();

        vdp.upload(&tileset, 10, TransferMode::Dma);

        assert_eq!(&vdp.tile_data(10)[..4], &[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(vdp.stats().dma, 1);
        assert_eq!(vdp.stats().tiles, 1);
    }

    #[test]
    fn test_upload_counts_modes() {
        let mut vdp = Vdp::new();
        let tileset = TileSet::new(solid_tile(1)).unwrap();

        vdp.upload(&tileset, 0, TransferMode::Cpu);
        vdp.upload(&tileset, 0, TransferMode::DmaQueue);
        vdp.upload(&tileset, 0, TransferMode::DmaQueue);

        let stats = vdp.stats();
        assert_eq!((stats.cpu, stats.dma, stats.dma_queue), (1, 0, 2));
        assert_eq!(stats.tiles, 3);
    }

    #[test]
    fn test_upload_wraps_at_end_of_vram() {
        let mut vdp = Vdp::new();
        let mut words = solid_tile(2);
        words.extend(solid_tile(3));
        let tileset = TileSet::new(words).unwrap();

        vdp.upload(&tileset, (VRAM_TILES - 1) as u16, TransferMode::Dma);

        assert!(vdp.tile_data((VRAM_TILES - 1) as u16).iter().all(|&b| b == 0x22));
        assert!(vdp.tile_data(0).iter().all(|&b| b == 0x33));
    }

    #[test]
    fn test_set_cell_wraps_coordinates() {
        let mut vdp = Vdp::new();
        let attr = TileAttribute::new(1, false, false, true, 5);

        vdp.set_cell(Plane::B, attr, 65, 33);

        assert_eq!(vdp.tile_attr(Plane::B, 1, 1), attr);
        assert_eq!(vdp.tile_attr(Plane::B, 65, 33), attr);
        assert_eq!(vdp.tile_attr(Plane::A, 1, 1), TileAttribute::default());
    }

    #[test]
    fn test_load_palette() {
        let mut vdp = Vdp::new();
        vdp.load_palette(2, &[0x0000, 0x000E]).unwrap();

        assert_eq!(vdp.cram(33), Some(0x000E));
        assert!(vdp.load_palette(4, &[0]).is_err());
        assert!(vdp.load_palette(0, &[0; 17]).is_err());
    }

    #[test]
    fn test_render_backdrop_and_hflip() {
        let mut vdp = Vdp::new();
        vdp.load_palette(0, &[0x0000, 0x000E, 0x00E0]).unwrap();
        vdp.set_backdrop(0, 2);

        // Left half colour 1, right half transparent
        let tileset = TileSet::new(vec![0x1111_0000; 8]).unwrap();
        vdp.upload(&tileset, 1, TransferMode::Dma);
        vdp.set_cell(Plane::A, TileAttribute::new(0, false, false, false, 1), 0, 0);
        vdp.set_cell(Plane::A, TileAttribute::new(0, false, false, true, 1), 1, 0);
        vdp.render();

        let frame = vdp.get_frame();
        let red = 0xFFFF0000;
        let green = 0xFF00FF00;
        assert_eq!(frame.pixel(0, 0), Some(red));
        assert_eq!(frame.pixel(7, 0), Some(green));
        assert_eq!(frame.pixel(8, 0), Some(green));
        assert_eq!(frame.pixel(15, 0), Some(red));
        assert_eq!(frame.pixel(100, 100), Some(green));
    }

    #[test]
    fn test_render_priority_order() {
        let mut vdp = Vdp::new();
        vdp.load_palette(0, &[0x0000, 0x000E, 0x0E00]).unwrap();
        let mut words = solid_tile(1);
        words.extend(solid_tile(2));
        vdp.upload(&TileSet::new(words).unwrap(), 1, TransferMode::Dma);

        // High priority B beats low priority A
        vdp.set_cell(Plane::A, TileAttribute::new(0, false, false, false, 1), 0, 0);
        vdp.set_cell(Plane::B, TileAttribute::new(0, true, false, false, 2), 0, 0);
        // Equal priority: A on top
        vdp.set_cell(Plane::A, TileAttribute::new(0, false, false, false, 1), 1, 0);
        vdp.set_cell(Plane::B, TileAttribute::new(0, false, false, false, 2), 1, 0);
        vdp.render();

        let frame = vdp.get_frame();
        assert_eq!(frame.pixel(0, 0), Some(0xFF0000FF));
        assert_eq!(frame.pixel(8, 0), Some(0xFFFF0000));
    }

    #[test]
    fn test_reset_clears_memories() {
        let mut vdp = Vdp::new();
        vdp.upload(&TileSet::new(solid_tile(5)).unwrap(), 0, TransferMode::Dma);
        vdp.set_cell(Plane::A, TileAttribute::from_bits(0xFFFF), 0, 0);
        vdp.load_palette(0, &[0x0EEE]).unwrap();

        vdp.reset();

        assert!(vdp.vram().iter().all(|&b| b == 0));
        assert_eq!(vdp.tile_attr(Plane::A, 0, 0).bits(), 0);
        assert_eq!(vdp.cram(0), Some(0));
        assert_eq!(vdp.stats(), TransferStats::default());
    }

    #[test]
    fn test_save_load_state_roundtrip() {
        let mut vdp = Vdp::new();
        vdp.upload(&TileSet::new(solid_tile(7)).unwrap(), 3, TransferMode::Dma);
        vdp.set_cell(Plane::B, TileAttribute::new(3, true, false, true, 3), 4, 5);
        vdp.load_palette(1, &[0x0000, 0x0ACE]).unwrap();

        let state = vdp.save_state();
        let text = serde_json::to_string(&state).expect("serialize");
        let state2: Value = serde_json::from_str(&text).expect("deserialize");

        let mut restored = Vdp::new();
        restored.load_state(&state2).expect("load state");

        assert_eq!(restored.vram(), vdp.vram());
        assert_eq!(restored.tile_attr(Plane::B, 4, 5), vdp.tile_attr(Plane::B, 4, 5));
        assert_eq!(restored.cram(17), Some(0x0ACE));
        assert_eq!(restored.stats(), vdp.stats());
    }

    #[test]
    fn test_load_state_rejects_garbage() {
        let mut vdp = Vdp::new();
        assert!(vdp.load_state(&serde_json::json!({"vram": []})).is_err());
    }

    #[test]
    fn test_load_state_rejects_bad_plane_sizes() {
        let mut vdp = Vdp::new();
        let good = vdp.save_state();

        let mut empty_window = good.clone();
        empty_window["window"] = serde_json::json!({"width": 0, "height": 0, "cells": []});
        assert!(matches!(
            vdp.load_state(&empty_window),
            Err(GenesisError::InvalidPlaneSize { width: 0, height: 0 })
        ));

        let mut odd_plane = good.clone();
        odd_plane["plane_a"] =
            serde_json::json!({"width": 40, "height": 32, "cells": vec![0u16; 40 * 32]});
        assert!(matches!(
            vdp.load_state(&odd_plane),
            Err(GenesisError::InvalidPlaneSize { width: 40, height: 32 })
        ));

        let mut too_big = good.clone();
        let cells = vec![0u16; 128 * 128];
        too_big["plane_a"] = serde_json::json!({"width": 128, "height": 128, "cells": cells});
        too_big["plane_b"] = serde_json::json!({"width": 128, "height": 128, "cells": cells});
        assert!(vdp.load_state(&too_big).is_err());

        // Rejected states leave the VDP usable
        vdp.set_cell(Plane::Window, TileAttribute::from_bits(0x0001), 0, 0);
        assert_eq!(vdp.tile_attr(Plane::Window, 0, 0).bits(), 0x0001);
        assert!(vdp.load_state(&good).is_ok());
    }
}
