use crate::app::canvas::{anchored_text_rect, Canvas, Color, TextAnchor};
use crate::app::font::FontHandle;
use crate::app::geometry::Rect;
use crate::app::{LoopMetricsSnapshot, SceneKey};

const TEXT_SCALE: i32 = 2;
const LINE_ADVANCE: i32 = 7 * TEXT_SCALE;
const OVERLAY_PADDING: i32 = 6 * TEXT_SCALE;
const OVERLAY_PANEL_INSET_X: i32 = 4 * TEXT_SCALE;
const OVERLAY_PANEL_INSET_Y: i32 = 3 * TEXT_SCALE;
const OVERLAY_TEXT_PRIMARY_COLOR: Color = [244, 248, 252, 255];
const OVERLAY_TEXT_DIM_COLOR: Color = [176, 198, 220, 255];
const OVERLAY_PANEL_BG_COLOR: Color = [10, 12, 16, 210];
const OVERLAY_PANEL_BORDER_COLOR: Color = [92, 106, 126, 255];
const PERF_SECTION_LABEL: &str = "Perf";
const SCENE_SECTION_LABEL: &str = "Scene";

#[derive(Debug, Clone)]
pub(crate) struct OverlayData {
    pub metrics: LoopMetricsSnapshot,
    pub render_fps_cap: Option<u32>,
    pub slow_frame_delay_ms: u64,
    pub scene: SceneKey,
    pub scene_lines: Vec<String>,
}

pub(crate) fn draw_overlay(canvas: &mut Canvas, data: &OverlayData) {
    let lines = build_overlay_lines(data);
    if lines.is_empty() {
        return;
    }
    let font = FontHandle::new(TEXT_SCALE);

    let widest = lines
        .iter()
        .map(|line| anchored_text_rect(line, font, TextAnchor::TopLeft, (0, 0)).width)
        .max()
        .unwrap_or(0);
    let panel = Rect::new(
        OVERLAY_PADDING - OVERLAY_PANEL_INSET_X,
        OVERLAY_PADDING - OVERLAY_PANEL_INSET_Y,
        widest + OVERLAY_PANEL_INSET_X * 2,
        lines.len() as i32 * LINE_ADVANCE + OVERLAY_PANEL_INSET_Y * 2,
    );
    canvas.fill_rect(panel, OVERLAY_PANEL_BG_COLOR);
    canvas.outline_rect(panel, OVERLAY_PANEL_BORDER_COLOR);

    let mut y = OVERLAY_PADDING;
    for line in &lines {
        canvas.draw_text(
            line,
            font,
            overlay_line_color(line),
            TextAnchor::TopLeft,
            (OVERLAY_PADDING, y),
        );
        y += LINE_ADVANCE;
    }
}

fn build_overlay_lines(data: &OverlayData) -> Vec<String> {
    let mut lines = vec![
        PERF_SECTION_LABEL.to_string(),
        format_fps_line(
            data.metrics.fps,
            data.render_fps_cap,
            data.slow_frame_delay_ms,
        ),
        format!("TPS: {:.1}", data.metrics.tps),
        format!("Frame: {:.2} ms", data.metrics.frame_time_ms),
        format!("Dropped: {} ticks", data.metrics.dropped_ticks),
        String::new(),
        SCENE_SECTION_LABEL.to_string(),
        format!("Active: {:?}", data.scene),
    ];
    lines.extend(data.scene_lines.iter().cloned());
    lines
}

fn overlay_line_color(line: &str) -> Color {
    if matches!(line, PERF_SECTION_LABEL | SCENE_SECTION_LABEL) {
        OVERLAY_TEXT_DIM_COLOR
    } else {
        OVERLAY_TEXT_PRIMARY_COLOR
    }
}

fn format_fps_line(current_fps: f32, cap: Option<u32>, slow_frame_delay_ms: u64) -> String {
    let cap_text = match cap {
        Some(value) => value.to_string(),
        None => "inf".to_string(),
    };
    format!(
        "[{:.0} / {}] dbg+{}ms",
        current_fps, cap_text, slow_frame_delay_ms
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::canvas::DrawCommand;

    fn sample_data(scene_lines: Vec<String>) -> OverlayData {
        OverlayData {
            metrics: LoopMetricsSnapshot::default(),
            render_fps_cap: Some(60),
            slow_frame_delay_ms: 0,
            scene: SceneKey::Gameplay,
            scene_lines,
        }
    }

    #[test]
    fn scene_lines_follow_builtin_sections() {
        let lines = build_overlay_lines(&sample_data(vec![
            "phase: playing".to_string(),
            "projectiles: 3".to_string(),
        ]));
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[6], SCENE_SECTION_LABEL);
        assert_eq!(lines[7], "Active: Gameplay");
        assert_eq!(lines[9], "projectiles: 3");
    }

    #[test]
    fn draw_overlay_emits_backing_plate_first() {
        let mut canvas = Canvas::new(320, 180);
        draw_overlay(&mut canvas, &sample_data(Vec::new()));

        assert!(matches!(
            canvas.commands()[0],
            DrawCommand::FillRect {
                color: OVERLAY_PANEL_BG_COLOR,
                ..
            }
        ));
        let text_count = canvas
            .commands()
            .iter()
            .filter(|command| matches!(command, DrawCommand::Text { .. }))
            .count();
        assert_eq!(text_count, 8);
    }

    #[test]
    fn fps_line_formats_cap_on_and_debug_delay() {
        assert_eq!(format_fps_line(144.4, Some(240), 200), "[144 / 240] dbg+200ms");
        assert_eq!(format_fps_line(144.4, None, 0), "[144 / inf] dbg+0ms");
    }
}
