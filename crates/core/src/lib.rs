//! Core video primitives shared by the mirrored-blit crates.

pub mod logging;
pub mod ppu;
pub mod renderer;

pub mod types {
    use serde::{Deserialize, Serialize};

    /// ARGB8888 framebuffer.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Frame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u32>,
    }

    impl Frame {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }

        /// Pixel at `(x, y)`, or `None` outside the frame.
        pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
            if x >= self.width || y >= self.height {
                return None;
            }
            self.pixels.get((y * self.width + x) as usize).copied()
        }

        /// Write the frame as a binary PPM (P6) image.
        pub fn write_ppm<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
            write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
            let mut rgb = Vec::with_capacity(self.pixels.len() * 3);
            for &p in &self.pixels {
                rgb.extend_from_slice(&[(p >> 16) as u8, (p >> 8) as u8, p as u8]);
            }
            out.write_all(&rgb)
        }
    }
}
