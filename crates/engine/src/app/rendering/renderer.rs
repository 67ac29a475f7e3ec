use std::sync::Arc;

use pixels::{Pixels, SurfaceTexture};
use thiserror::Error;
use winit::window::Window;

use crate::app::canvas::Canvas;
use crate::app::geometry::Vec2;
use crate::app::tools::{draw_overlay, OverlayData};

use super::raster::rasterize;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Pixels(#[from] pixels::Error),
    #[error("failed to resize surface: {0}")]
    Resize(#[from] pixels::TextureError),
}

/// Presents a fixed-resolution frame buffer, letterboxed into the window by `pixels`.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    frame_width: u32,
    frame_height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, frame_width: u32, frame_height: u32) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = Pixels::new(frame_width, frame_height, surface)?;
        Ok(Self {
            window,
            pixels,
            frame_width,
            frame_height,
        })
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)?;
        Ok(())
    }

    /// Maps a window-space cursor position into frame-buffer pixels, clamped to the frame.
    pub fn window_to_frame_px(&self, position: Vec2) -> Vec2 {
        let mapped = self.pixels.window_pos_to_pixel((position.x, position.y));
        frame_px_from_mapping(mapped, self.frame_width, self.frame_height)
    }

    pub(crate) fn present(
        &mut self,
        canvas: &Canvas,
        overlay: Option<&OverlayData>,
    ) -> Result<(), RenderError> {
        let (width, height) = (self.frame_width, self.frame_height);
        let frame = self.pixels.frame_mut();
        rasterize(frame, width, height, canvas);
        if let Some(overlay) = overlay {
            let mut overlay_canvas = Canvas::new(width, height);
            draw_overlay(&mut overlay_canvas, overlay);
            rasterize(frame, width, height, &overlay_canvas);
        }
        self.pixels.render()?;
        Ok(())
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// `pixels` reports positions in the letterbox margin as `Err` with unclamped coordinates.
fn frame_px_from_mapping(
    mapped: Result<(usize, usize), (isize, isize)>,
    frame_width: u32,
    frame_height: u32,
) -> Vec2 {
    match mapped {
        Ok((x, y)) => Vec2::new(x as f32, y as f32),
        Err((x, y)) => Vec2::new(
            x.clamp(0, frame_width.max(1) as isize - 1) as f32,
            y.clamp(0, frame_height.max(1) as isize - 1) as f32,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inside_positions_pass_through() {
        assert_eq!(frame_px_from_mapping(Ok((12, 340)), 640, 360), Vec2::new(12.0, 340.0));
    }

    #[test]
    fn letterbox_positions_clamp_to_frame_edges() {
        assert_eq!(frame_px_from_mapping(Err((-30, 100)), 640, 360), Vec2::new(0.0, 100.0));
        assert_eq!(frame_px_from_mapping(Err((700, 400)), 640, 360), Vec2::new(639.0, 359.0));
        assert_eq!(frame_px_from_mapping(Err((5, -1)), 640, 360), Vec2::new(5.0, 0.0));
    }
}
