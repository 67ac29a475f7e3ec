mod assets;
mod canvas;
mod font;
mod geometry;
mod input;
mod loop_runner;
mod mask;
mod metrics;
mod rendering;
mod scene;
mod tools;

pub use assets::{AssetError, AssetStore, Bitmap};
pub use canvas::{anchored_text_rect, Canvas, Color, DrawCommand, TextAnchor, BLACK, WHITE};
pub use font::{text_size, FontHandle};
pub use geometry::{Rect, Vec2};
pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use mask::BitMask;
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{RenderError, Renderer};
pub use scene::{InputSnapshot, Scene, SceneCommand, SceneKey, SceneWorld};
