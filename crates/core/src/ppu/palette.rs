//! Indexed palette storage for colour RAM.
//!
//! The Genesis CRAM holds 64 entries: four palettes of 16 colours, each a
//! 9-bit BGR value stored as `0000BBB0GGG0RRR0`. Tiles only ever carry a
//! palette selector and a 4-bit colour index, so the final colour is
//! `cram[palette * 16 + index]`.

/// Generic indexed palette that maps colour indices to ARGB values.
pub trait IndexedPalette {
    /// Get the ARGB colour (0xAARRGGBB) for a palette index.
    fn get_color(&self, index: usize) -> u32;

    /// Set the ARGB colour for a palette index.
    fn set_color(&mut self, index: usize, color: u32);

    /// Get the number of colours in this palette.
    fn len(&self) -> usize;

    /// Check if the palette is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A simple RAM-based palette storage.
#[derive(Debug, Clone)]
pub struct RamPalette {
    colors: Vec<u32>,
}

impl RamPalette {
    /// Create a new palette with the specified number of colours.
    pub fn new(size: usize) -> Self {
        Self {
            colors: vec![0xFF000000; size], // Default to opaque black
        }
    }

    /// Create a palette from a list of colours.
    pub fn from_colors(colors: Vec<u32>) -> Self {
        Self { colors }
    }

    /// Get a slice of all colours.
    pub fn colors(&self) -> &[u32] {
        &self.colors
    }

    /// Reset every entry to opaque black.
    pub fn clear(&mut self) {
        self.colors.fill(0xFF000000);
    }
}

impl IndexedPalette for RamPalette {
    fn get_color(&self, index: usize) -> u32 {
        self.colors.get(index).copied().unwrap_or(0xFF000000)
    }

    fn set_color(&mut self, index: usize, color: u32) {
        if let Some(slot) = self.colors.get_mut(index) {
            *slot = color;
        }
    }

    fn len(&self) -> usize {
        self.colors.len()
    }
}

/// Convert a Genesis CRAM word (`0000BBB0GGG0RRR0`) to ARGB8888.
pub fn genesis_to_argb(color: u16) -> u32 {
    let r = ((color >> 1) & 0x7) as u32;
    let g = ((color >> 5) & 0x7) as u32;
    let b = ((color >> 9) & 0x7) as u32;

    // Scale 3-bit to 8-bit (0-7 -> 0-252), keeping full white at 0xFF
    let scale = |c: u32| if c == 7 { 0xFF } else { c * 36 };

    0xFF000000 | (scale(r) << 16) | (scale(g) << 8) | scale(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ram_palette_creation() {
        let palette = RamPalette::new(64);
        assert_eq!(palette.len(), 64);
        assert!(!palette.is_empty());
        assert!(palette.colors().iter().all(|&c| c == 0xFF000000));
    }

    #[test]
    fn test_ram_palette_set_get_and_clear() {
        let mut palette = RamPalette::new(4);

        palette.set_color(1, 0xFF00FF00);
        palette.set_color(3, 0xFFFFFFFF);
        assert_eq!(palette.get_color(1), 0xFF00FF00);
        assert_eq!(palette.get_color(3), 0xFFFFFFFF);

        palette.clear();
        assert_eq!(palette.get_color(3), 0xFF000000);
    }

    #[test]
    fn test_ram_palette_out_of_bounds() {
        let mut palette = RamPalette::from_colors(vec![0xFF123456]);

        // Out of bounds reads return black, writes are ignored
        assert_eq!(palette.get_color(10), 0xFF000000);
        palette.set_color(10, 0xFFFF0000);
        assert_eq!(palette.len(), 1);
    }

    #[test]
    fn test_genesis_color_decode() {
        assert_eq!(genesis_to_argb(0x0000), 0xFF000000);
        assert_eq!(genesis_to_argb(0x0EEE), 0xFFFFFFFF);
        assert_eq!(genesis_to_argb(0x000E), 0xFFFF0000);
        assert_eq!(genesis_to_argb(0x00E0), 0xFF00FF00);
        assert_eq!(genesis_to_argb(0x0E00), 0xFF0000FF);
        // Unused bits are ignored
        assert_eq!(genesis_to_argb(0xF001), 0xFF000000);
    }
}
