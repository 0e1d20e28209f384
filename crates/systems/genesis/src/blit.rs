//! Image placement on background planes.
//!
//! [`draw_image_flipped_h`] mirrors an image horizontally without touching its
//! tile patterns: columns are read right to left and every cell gets the
//! hardware HFLIP bit, so the mirrored copy costs no extra VRAM.
//!
//! Neither routine validates coordinates or tile indices; the target decides
//! what out-of-range writes mean. Both assume exclusive access to the target
//! for the whole call, so callers that race the display should run them
//! during vertical blank.

use crate::attr::TileAttribute;
use crate::image::{ImageAsset, TileMap, TileSet};
use crate::vdp::{Plane, TileMapWriter, TileUploader, TransferMode};
use mdflip_core::logging::{log, LogCategory, LogLevel};

/// Why a blit drew nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingImage,
    MissingTileset,
    MissingTilemap,
}

/// Result of a blit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitOutcome {
    /// Tiles were uploaded and `cells` plane cells written
    Drawn { cells: usize },
    /// Nothing was uploaded or written
    Skipped(SkipReason),
}

impl BlitOutcome {
    pub fn is_drawn(&self) -> bool {
        matches!(self, BlitOutcome::Drawn { .. })
    }
}

/// Where and how an image lands on a plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRequest {
    pub plane: Plane,
    /// VRAM tile index receiving the image's first tile
    pub base_tile_index: u16,
    /// Top-left cell
    pub x: u16,
    pub y: u16,
    /// Palette line (0-3)
    pub palette: u8,
    pub priority: bool,
}

impl PlacementRequest {
    /// Low priority placement
    pub fn new(plane: Plane, base_tile_index: u16, x: u16, y: u16, palette: u8) -> Self {
        Self {
            plane,
            base_tile_index,
            x,
            y,
            palette,
            priority: false,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }
}

/// Horizontally mirrored image blit
pub struct MirroredTileBlit;

impl MirroredTileBlit {
    /// Upload `image`'s tiles at the request's base index and place the image
    /// mirrored left to right with its top-left corner at `(x, y)`.
    ///
    /// Cell `(x + c, y + r)` receives `base + tilemap[r][w - 1 - c]` with
    /// HFLIP set and VFLIP clear. A missing image, tileset or tilemap skips
    /// the call without side effects.
    pub fn render<T>(target: &mut T, image: Option<&ImageAsset>, req: &PlacementRequest) -> BlitOutcome
    where
        T: TileUploader + TileMapWriter + ?Sized,
    {
        place(target, image, req, true)
    }
}

/// Mirrored blit with every placement parameter spelled out.
#[allow(clippy::too_many_arguments)]
pub fn draw_image_flipped_h<T>(
    target: &mut T,
    plane: Plane,
    image: Option<&ImageAsset>,
    base_tile_index: u16,
    x: u16,
    y: u16,
    palette: u8,
    priority: bool,
) -> BlitOutcome
where
    T: TileUploader + TileMapWriter + ?Sized,
{
    let req = PlacementRequest::new(plane, base_tile_index, x, y, palette).with_priority(priority);
    MirroredTileBlit::render(target, image, &req)
}

/// Unmirrored counterpart of [`draw_image_flipped_h`]: same upload, cells
/// copied in tilemap order with both flip bits clear.
#[allow(clippy::too_many_arguments)]
pub fn draw_image<T>(
    target: &mut T,
    plane: Plane,
    image: Option<&ImageAsset>,
    base_tile_index: u16,
    x: u16,
    y: u16,
    palette: u8,
    priority: bool,
) -> BlitOutcome
where
    T: TileUploader + TileMapWriter + ?Sized,
{
    let req = PlacementRequest::new(plane, base_tile_index, x, y, palette).with_priority(priority);
    place(target, image, &req, false)
}

fn resolve(image: Option<&ImageAsset>) -> Result<(&TileSet, &TileMap), SkipReason> {
    let image = image.ok_or(SkipReason::MissingImage)?;
    let tileset = image.tileset.as_ref().ok_or(SkipReason::MissingTileset)?;
    let tilemap = image.tilemap.as_ref().ok_or(SkipReason::MissingTilemap)?;
    Ok((tileset, tilemap))
}

fn place<T>(target: &mut T, image: Option<&ImageAsset>, req: &PlacementRequest, mirror: bool) -> BlitOutcome
where
    T: TileUploader + TileMapWriter + ?Sized,
{
    let (tileset, tilemap) = match resolve(image) {
        Ok(parts) => parts,
        Err(reason) => {
            log(LogCategory::Blit, LogLevel::Debug, || {
                format!("Blit: skipped, {:?}", reason)
            });
            return BlitOutcome::Skipped(reason);
        }
    };

    target.upload(tileset, req.base_tile_index, TransferMode::Dma);

    let width = tilemap.w();
    let height = tilemap.h();
    let entries = tilemap.entries();

    for row in 0..height {
        let line = &entries[row as usize * width as usize..(row as usize + 1) * width as usize];
        for col in 0..width {
            let src_col = if mirror { width - 1 - col } else { col };
            let tile_index = req.base_tile_index.wrapping_add(line[src_col as usize]);
            let attr = TileAttribute::new(req.palette, req.priority, false, mirror, tile_index);

            target.set_cell(req.plane, attr, req.x.wrapping_add(col), req.y.wrapping_add(row));
        }
    }

    log(LogCategory::Blit, LogLevel::Trace, || {
        format!(
            "Blit: {}x{} image{} at ({}, {}) on {}, tiles from {}",
            width,
            height,
            if mirror { " mirrored" } else { "" },
            req.x,
            req.y,
            req.plane,
            req.base_tile_index
        )
    });

    BlitOutcome::Drawn {
        cells: width as usize * height as usize,
    }
}
