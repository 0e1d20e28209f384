//! Common renderer trait for video models.
//!
//! Anything that can compose its memories into a picture implements
//! [`Renderer`]. The Genesis VDP model uses it to produce host-side previews of
//! what a blit left on the planes; nothing here is tied to a display loop.
//!
//! ```rust,ignore
//! use mdflip_core::renderer::Renderer;
//!
//! vdp.render();
//! let frame = vdp.get_frame();
//! assert_eq!(frame.width, 320);
//! ```

use crate::types::Frame;

/// Common renderer trait for emulated graphics hardware
pub trait Renderer: Send {
    /// Get the current framebuffer (read-only)
    fn get_frame(&self) -> &Frame;

    /// Recompose the framebuffer from the current video memory contents
    fn render(&mut self);

    /// Clear the framebuffer with a solid colour
    ///
    /// # Arguments
    /// * `color` - ARGB8888 colour value (0xAARRGGBB)
    fn clear(&mut self, color: u32);

    /// Reset the renderer and its video memories to power-on state
    fn reset(&mut self);

    /// Get the name of this renderer (for debugging/UI)
    fn name(&self) -> &str;
}
