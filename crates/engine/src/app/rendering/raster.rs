use crate::app::assets::Bitmap;
use crate::app::canvas::{Canvas, Color, DrawCommand};
use crate::app::font::{glyph_rows, FontHandle, GLYPH_WIDTH};
use crate::app::geometry::Rect;

/// Replays `canvas` into an RGBA8 frame of `width` x `height` pixels. Every write is clipped.
pub(crate) fn rasterize(frame: &mut [u8], width: u32, height: u32, canvas: &Canvas) {
    if width == 0 || height == 0 {
        return;
    }
    for command in canvas.commands() {
        match command {
            DrawCommand::Fill(color) => fill_frame(frame, *color),
            DrawCommand::FillRect { rect, color } => {
                draw_filled_rect(frame, width, height, *rect, *color)
            }
            DrawCommand::OutlineRect { rect, color } => {
                draw_rect_outline(frame, width, height, *rect, *color)
            }
            DrawCommand::Blit { bitmap, top_left } => {
                blit_bitmap(frame, width, height, bitmap, *top_left)
            }
            DrawCommand::Text {
                text,
                font,
                color,
                top_left,
            } => draw_text_clipped(frame, width, height, *top_left, text, *font, *color),
        }
    }
}

fn fill_frame(frame: &mut [u8], color: Color) {
    for px in frame.chunks_exact_mut(4) {
        px.copy_from_slice(&color);
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y
        .checked_mul(width as usize)
        .and_then(|row| row.checked_add(x))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    let dst = &mut frame[byte_offset..end];
    match color[3] {
        0 => {}
        255 => dst.copy_from_slice(&color),
        alpha => {
            let blended = blend_over([dst[0], dst[1], dst[2], dst[3]], color, alpha);
            dst.copy_from_slice(&blended);
        }
    }
}

fn blend_over(dst: Color, src: Color, alpha: u8) -> Color {
    let a = alpha as u32;
    let inv = 255 - a;
    let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * inv + 127) / 255) as u8;
    [mix(src[0], dst[0]), mix(src[1], dst[1]), mix(src[2], dst[2]), 255]
}

fn draw_filled_rect(frame: &mut [u8], width: u32, height: u32, rect: Rect, color: Color) {
    let start_x = rect.left().max(0);
    let start_y = rect.top().max(0);
    let end_x = rect.right().min(width as i32);
    let end_y = rect.bottom().min(height as i32);
    if end_x <= start_x || end_y <= start_y {
        return;
    }
    for py in start_y..end_y {
        for px in start_x..end_x {
            write_pixel_rgba_clipped(frame, width, height, px, py, color);
        }
    }
}

fn draw_rect_outline(frame: &mut [u8], width: u32, height: u32, rect: Rect, color: Color) {
    if rect.width <= 1 || rect.height <= 1 {
        return;
    }
    let edges = [
        Rect::new(rect.x, rect.y, rect.width, 1),
        Rect::new(rect.x, rect.bottom() - 1, rect.width, 1),
        Rect::new(rect.x, rect.y + 1, 1, rect.height - 2),
        Rect::new(rect.right() - 1, rect.y + 1, 1, rect.height - 2),
    ];
    for edge in edges {
        draw_filled_rect(frame, width, height, edge, color);
    }
}

fn blit_bitmap(frame: &mut [u8], width: u32, height: u32, bitmap: &Bitmap, top_left: (i32, i32)) {
    let (left, top) = top_left;
    let draw_left = left.max(0);
    let draw_top = top.max(0);
    let draw_right = (left + bitmap.width() as i32).min(width as i32);
    let draw_bottom = (top + bitmap.height() as i32).min(height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }
    for out_y in draw_top..draw_bottom {
        for out_x in draw_left..draw_right {
            let src_x = (out_x - left) as u32;
            let src_y = (out_y - top) as u32;
            if let Some(color) = bitmap.pixel(src_x, src_y) {
                write_pixel_rgba_clipped(frame, width, height, out_x, out_y, color);
            }
        }
    }
}

fn draw_text_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    origin: (i32, i32),
    text: &str,
    font: FontHandle,
    color: Color,
) {
    let (mut x, y) = origin;
    for ch in text.chars() {
        draw_glyph_clipped(frame, width, height, (x, y), glyph_rows(ch), font.scale(), color);
        x += font.glyph_advance();
    }
}

fn draw_glyph_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    origin: (i32, i32),
    rows: [u8; crate::app::font::GLYPH_HEIGHT],
    scale: i32,
    color: Color,
) {
    let (x, y) = origin;
    for (row_index, row_bits) in rows.iter().enumerate() {
        let glyph_y = y + row_index as i32 * scale;
        for col in 0..GLYPH_WIDTH {
            if (row_bits & (1 << (GLYPH_WIDTH - 1 - col))) == 0 {
                continue;
            }
            let cell = Rect::new(x + col * scale, glyph_y, scale, scale);
            draw_filled_rect(frame, width, height, cell, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::app::canvas::{TextAnchor, BLACK, WHITE};

    fn pixel_at(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn blit_skips_transparent_pixels_and_clips() {
        let mut rgba = vec![0u8; 2 * 2 * 4];
        rgba[0..4].copy_from_slice(&[200, 10, 10, 255]);
        let bitmap = Arc::new(Bitmap::from_rgba(2, 2, rgba).expect("bitmap"));
        let mut canvas = Canvas::new(4, 4);
        canvas.fill(BLACK);
        canvas.blit(&bitmap, (3, 3));
        canvas.blit(&bitmap, (-1, -1));

        let mut frame = vec![0u8; 4 * 4 * 4];
        rasterize(&mut frame, 4, 4, &canvas);

        assert_eq!(pixel_at(&frame, 4, 3, 3), [200, 10, 10, 255]);
        assert_eq!(pixel_at(&frame, 4, 0, 0), BLACK);
    }

    #[test]
    fn translucent_fill_blends_over_background() {
        let mut canvas = Canvas::new(2, 1);
        canvas.fill(BLACK);
        canvas.fill_rect(Rect::new(0, 0, 1, 1), [255, 255, 255, 128]);
        let mut frame = vec![0u8; 2 * 4];
        rasterize(&mut frame, 2, 1, &canvas);

        assert_eq!(pixel_at(&frame, 2, 0, 0), [128, 128, 128, 255]);
        assert_eq!(pixel_at(&frame, 2, 1, 0), BLACK);
    }

    #[test]
    fn text_writes_glyph_pixels_at_scale() {
        let mut canvas = Canvas::new(16, 16);
        canvas.fill(BLACK);
        canvas.draw_text("I", FontHandle::new(2), WHITE, TextAnchor::TopLeft, (0, 0));
        let mut frame = vec![0u8; 16 * 16 * 4];
        rasterize(&mut frame, 16, 16, &canvas);

        // Top row of 'I' is fully lit: 3 columns x scale 2.
        for x in 0..6 {
            assert_eq!(pixel_at(&frame, 16, x, 0), WHITE, "x={x}");
        }
        assert_eq!(pixel_at(&frame, 16, 0, 2), BLACK);
        assert_eq!(pixel_at(&frame, 16, 2, 2), WHITE);
    }

    #[test]
    fn tiny_or_offscreen_draws_are_safe() {
        let mut canvas = Canvas::new(1, 1);
        canvas.draw_text("Frame", FontHandle::new(3), WHITE, TextAnchor::Center, (-10, -10));
        canvas.outline_rect(Rect::new(-5, -5, 100, 100), WHITE);
        let mut frame = vec![0u8; 4];
        rasterize(&mut frame, 1, 1, &canvas);
        rasterize(&mut [], 0, 8, &canvas);
    }
}
