mod raster;
mod renderer;

pub use renderer::{RenderError, Renderer};
