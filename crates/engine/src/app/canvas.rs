use std::sync::Arc;

use super::assets::Bitmap;
use super::font::{text_size, FontHandle};
use super::geometry::Rect;

pub type Color = [u8; 4];

pub const WHITE: Color = [255, 255, 255, 255];
pub const BLACK: Color = [0, 0, 0, 255];

/// Which point of the text box the `point` argument of `draw_text` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    TopLeft,
    TopRight,
    MidTop,
    MidBottom,
    Center,
}

#[derive(Debug, Clone)]
pub enum DrawCommand {
    Fill(Color),
    FillRect { rect: Rect, color: Color },
    OutlineRect { rect: Rect, color: Color },
    Blit { bitmap: Arc<Bitmap>, top_left: (i32, i32) },
    Text {
        text: String,
        font: FontHandle,
        color: Color,
        top_left: (i32, i32),
    },
}

/// Retained list of draw calls for one frame, replayed in order by the renderer.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    pub fn fill(&mut self, color: Color) {
        self.commands.push(DrawCommand::Fill(color));
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    pub fn outline_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::OutlineRect { rect, color });
    }

    pub fn blit(&mut self, bitmap: &Arc<Bitmap>, top_left: (i32, i32)) {
        self.commands.push(DrawCommand::Blit {
            bitmap: Arc::clone(bitmap),
            top_left,
        });
    }

    /// Queues `text` and returns the rectangle it will occupy.
    pub fn draw_text(
        &mut self,
        text: &str,
        font: FontHandle,
        color: Color,
        anchor: TextAnchor,
        point: (i32, i32),
    ) -> Rect {
        let rect = anchored_text_rect(text, font, anchor, point);
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            font,
            color,
            top_left: rect.top_left(),
        });
        rect
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

pub fn anchored_text_rect(text: &str, font: FontHandle, anchor: TextAnchor, point: (i32, i32)) -> Rect {
    let (width, height) = text_size(text, font);
    let (x, y) = point;
    let (left, top) = match anchor {
        TextAnchor::TopLeft => (x, y),
        TextAnchor::TopRight => (x - width, y),
        TextAnchor::MidTop => (x - width / 2, y),
        TextAnchor::MidBottom => (x - width / 2, y - height),
        TextAnchor::Center => (x - width / 2, y - height / 2),
    };
    Rect::new(left, top, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_position_text_box() {
        let font = FontHandle::new(1);
        // "abc" is 11x5 at scale 1.
        assert_eq!(
            anchored_text_rect("abc", font, TextAnchor::TopRight, (100, 20)),
            Rect::new(89, 20, 11, 5)
        );
        assert_eq!(
            anchored_text_rect("abc", font, TextAnchor::MidBottom, (50, 50)),
            Rect::new(45, 45, 11, 5)
        );
        assert_eq!(
            anchored_text_rect("abc", font, TextAnchor::Center, (50, 50)),
            Rect::new(45, 48, 11, 5)
        );
    }

    #[test]
    fn commands_are_kept_in_call_order() {
        let mut canvas = Canvas::new(64, 32);
        let bitmap = Arc::new(Bitmap::solid(2, 2, WHITE));
        canvas.fill(BLACK);
        canvas.blit(&bitmap, (3, 4));
        let rect = canvas.draw_text("hi", FontHandle::new(2), WHITE, TextAnchor::TopLeft, (1, 1));

        assert_eq!(rect, Rect::new(1, 1, 14, 10));
        assert_eq!(canvas.commands().len(), 3);
        assert!(matches!(canvas.commands()[0], DrawCommand::Fill(BLACK)));
        assert!(matches!(
            canvas.commands()[1],
            DrawCommand::Blit { top_left: (3, 4), .. }
        ));
        canvas.clear();
        assert!(canvas.commands().is_empty());
    }
}
