//! Tile pattern decoding.
//!
//! The Genesis VDP stores every 8x8 tile as 32 bytes, 4 bits per pixel,
//! row-major with the left pixel of each pair in the high nibble. Asset
//! compilers emit the same layout as eight big-endian 32-bit words, one per row.

/// Bytes occupied by one 8x8 4bpp tile in VRAM.
pub const TILE_BYTES: usize = 32;

/// 32-bit words occupied by one tile, as produced by asset compilers.
pub const TILE_WORDS: usize = 8;

/// Trait for decoding tile data into pixel indices.
pub trait TileDecoder {
    /// Decode a single pixel from a tile.
    ///
    /// # Arguments
    /// * `tile_data` - The raw tile data
    /// * `x` - X coordinate within the tile (0-7)
    /// * `y` - Y coordinate within the tile (0-7)
    ///
    /// # Returns
    /// The colour index within the tile's palette (0-15, 0 is transparent)
    fn decode_pixel(&self, tile_data: &[u8], x: u8, y: u8) -> u8;

    /// Get the size of a single tile in bytes.
    fn tile_size(&self) -> usize;
}

/// Genesis/Mega Drive 4bpp linear tile decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Genesis4BppDecoder;

impl Genesis4BppDecoder {
    /// Decode one pixel from a row word (`0x12345678` is pixels 1..8 left to right).
    pub fn decode_row_word(row: u32, x: u8) -> u8 {
        if x > 7 {
            return 0;
        }
        ((row >> (28 - 4 * x as u32)) & 0xF) as u8
    }
}

impl TileDecoder for Genesis4BppDecoder {
    fn decode_pixel(&self, tile_data: &[u8], x: u8, y: u8) -> u8 {
        if tile_data.len() < TILE_BYTES || x > 7 || y > 7 {
            return 0;
        }

        let byte = tile_data[y as usize * 4 + (x as usize >> 1)];
        if x & 1 == 0 {
            byte >> 4
        } else {
            byte & 0x0F
        }
    }

    fn tile_size(&self) -> usize {
        TILE_BYTES
    }
}

/// Expand row words into the byte layout VRAM holds (big-endian).
pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}
