use std::rc::Rc;

use coast_engine::{
    anchored_text_rect, Canvas, Color, FontHandle, InputAction, InputSnapshot, Rect, Scene,
    SceneCommand, SceneKey, SceneWorld, TextAnchor, WHITE,
};
use tracing::info;

use super::{
    GameContent, LevelSelection, MENU_BACKGROUND_IMAGE_KEY, MENU_FONT_KEY, TITLE_FONT_KEY,
    UI_FONT_KEY,
};

const TITLE_TEXT: &str = "COAST GUARDIAN";
const TITLE_Y_PX: i32 = 150;
const FIRST_ITEM_Y_PX: i32 = 300;
const ITEM_SPACING_PX: i32 = 70;
const HINT_MARGIN_PX: i32 = 30;
const HIGHLIGHT_COLOR: Color = [255, 200, 60, 255];
const MENU_FALLBACK_COLOR: Color = [10, 20, 50, 255];

#[derive(Debug, Clone)]
struct MenuEntry {
    level_number: u32,
    caption: String,
}

/// Level picker. Up/Down or the mouse moves the highlight; Enter or a click starts it.
pub(crate) struct MainMenuScene {
    content: Rc<GameContent>,
    selection: LevelSelection,
    bounds: Rect,
    entries: Vec<MenuEntry>,
    highlighted: usize,
    up_was_down: bool,
    down_was_down: bool,
}

impl MainMenuScene {
    pub(crate) fn new(content: Rc<GameContent>, selection: LevelSelection, bounds: Rect) -> Self {
        Self {
            content,
            selection,
            bounds,
            entries: Vec::new(),
            highlighted: 0,
            up_was_down: false,
            down_was_down: false,
        }
    }

    fn font(&self, key: &str) -> FontHandle {
        self.content.assets.font(key).unwrap_or_default()
    }

    fn entry_rect(&self, index: usize) -> Rect {
        let entry = &self.entries[index];
        let y = FIRST_ITEM_Y_PX + ITEM_SPACING_PX * index as i32;
        anchored_text_rect(
            &entry.caption,
            self.font(MENU_FONT_KEY),
            TextAnchor::Center,
            (self.bounds.center().0, y),
        )
    }

    fn entry_under_cursor(&self, input: &InputSnapshot) -> Option<usize> {
        let cursor = input.cursor_position_px()?.rounded_px();
        (0..self.entries.len()).find(|index| self.entry_rect(*index).contains_point(cursor))
    }

    fn start_highlighted(&self) -> SceneCommand {
        let Some(entry) = self.entries.get(self.highlighted) else {
            return SceneCommand::None;
        };
        self.selection.set(entry.level_number);
        info!(level = entry.level_number, "level_selected");
        SceneCommand::HardResetTo(SceneKey::Gameplay)
    }
}

impl Scene for MainMenuScene {
    fn load(&mut self, _world: &mut SceneWorld) {
        self.entries = self
            .content
            .defs
            .levels()
            .map(|level| MenuEntry {
                level_number: level.number,
                caption: format!("Level {}: {}", level.number, level.display_name()),
            })
            .collect();
        let selected = self.selection.get();
        self.highlighted = self
            .entries
            .iter()
            .position(|entry| entry.level_number == selected)
            .unwrap_or(0);
        info!(level_count = self.entries.len(), "main_menu_loaded");
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        input: &InputSnapshot,
        _world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.back_pressed() {
            return SceneCommand::Quit;
        }
        if self.entries.is_empty() {
            return SceneCommand::None;
        }

        let up_down = input.is_down(InputAction::MoveUp);
        let down_down = input.is_down(InputAction::MoveDown);
        if up_down && !self.up_was_down {
            self.highlighted = self.highlighted.checked_sub(1).unwrap_or(self.entries.len() - 1);
        }
        if down_down && !self.down_was_down {
            self.highlighted = (self.highlighted + 1) % self.entries.len();
        }
        self.up_was_down = up_down;
        self.down_was_down = down_down;

        let hovered = self.entry_under_cursor(input);
        if let Some(index) = hovered {
            self.highlighted = index;
        }

        if input.confirm_pressed() || (input.left_click_pressed() && hovered.is_some()) {
            return self.start_highlighted();
        }
        SceneCommand::None
    }

    fn render(&mut self, _world: &SceneWorld, canvas: &mut Canvas) {
        match self.content.assets.image(MENU_BACKGROUND_IMAGE_KEY) {
            Some(background) => canvas.blit(&background, (0, 0)),
            None => canvas.fill(MENU_FALLBACK_COLOR),
        }

        let center_x = self.bounds.center().0;
        canvas.draw_text(
            TITLE_TEXT,
            self.font(TITLE_FONT_KEY),
            WHITE,
            TextAnchor::Center,
            (center_x, TITLE_Y_PX),
        );

        let menu_font = self.font(MENU_FONT_KEY);
        if self.entries.is_empty() {
            canvas.draw_text(
                "No levels defined",
                menu_font,
                WHITE,
                TextAnchor::Center,
                (center_x, FIRST_ITEM_Y_PX),
            );
        }
        for (index, entry) in self.entries.iter().enumerate() {
            let color = if index == self.highlighted {
                HIGHLIGHT_COLOR
            } else {
                WHITE
            };
            let y = FIRST_ITEM_Y_PX + ITEM_SPACING_PX * index as i32;
            canvas.draw_text(&entry.caption, menu_font, color, TextAnchor::Center, (center_x, y));
        }

        canvas.draw_text(
            "Enter: start   Esc: quit",
            self.font(UI_FONT_KEY),
            WHITE,
            TextAnchor::MidBottom,
            (center_x, self.bounds.bottom() - HINT_MARGIN_PX),
        );
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.entries.clear();
        self.up_was_down = false;
        self.down_was_down = false;
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        Some("Coast Guardian | Main Menu".to_string())
    }
}

#[cfg(test)]
mod tests {
    use coast_engine::{AssetStore, DefDatabase, LevelDef, Vec2};

    use super::*;

    fn level(number: u32, label: Option<&str>) -> LevelDef {
        LevelDef {
            number,
            def_name: format!("level_{number}"),
            label: label.map(ToString::to_string),
            background: "levels/bg".to_string(),
            walkable_mask: "levels/mask".to_string(),
            spawn_point: (100, 100),
            player_size: (20, 30),
            foot_offset: (0, 0),
            duration_seconds: 60.0,
            victory_monster_limit: 20,
            weapon_spawns: Vec::new(),
            monster_spawns: Vec::new(),
        }
    }

    fn menu_with_levels(levels: Vec<LevelDef>) -> (MainMenuScene, LevelSelection, SceneWorld) {
        let content = Rc::new(GameContent {
            defs: DefDatabase::from_defs(Vec::new(), Vec::new(), levels),
            assets: AssetStore::in_memory(),
        });
        let selection = LevelSelection::new(1);
        let mut menu = MainMenuScene::new(content, selection.clone(), Rect::new(0, 0, 1280, 720));
        let mut world = SceneWorld::default();
        menu.load(&mut world);
        (menu, selection, world)
    }

    fn press(action: InputAction) -> InputSnapshot {
        InputSnapshot::empty().with_action_down(action, true)
    }

    #[test]
    fn entries_follow_level_numbers_and_labels() {
        let (menu, _, _) = menu_with_levels(vec![level(2, None), level(1, Some("Harbor"))]);
        let captions: Vec<&str> = menu.entries.iter().map(|entry| entry.caption.as_str()).collect();
        assert_eq!(captions, vec!["Level 1: Harbor", "Level 2: level_2"]);
    }

    #[test]
    fn down_moves_once_per_press_and_wraps() {
        let (mut menu, _, mut world) = menu_with_levels(vec![level(1, None), level(2, None)]);
        let held = press(InputAction::MoveDown);
        menu.update(1.0 / 60.0, &held, &mut world);
        menu.update(1.0 / 60.0, &held, &mut world);
        assert_eq!(menu.highlighted, 1);

        menu.update(1.0 / 60.0, &InputSnapshot::empty(), &mut world);
        menu.update(1.0 / 60.0, &held, &mut world);
        assert_eq!(menu.highlighted, 0);

        menu.update(1.0 / 60.0, &InputSnapshot::empty(), &mut world);
        menu.update(1.0 / 60.0, &press(InputAction::MoveUp), &mut world);
        assert_eq!(menu.highlighted, 1);
    }

    #[test]
    fn confirm_selects_level_and_resets_gameplay() {
        let (mut menu, selection, mut world) = menu_with_levels(vec![level(1, None), level(4, None)]);
        menu.update(1.0 / 60.0, &press(InputAction::MoveDown), &mut world);
        let command = menu.update(
            1.0 / 60.0,
            &InputSnapshot::empty().with_confirm_pressed(true),
            &mut world,
        );
        assert_eq!(command, SceneCommand::HardResetTo(SceneKey::Gameplay));
        assert_eq!(selection.get(), 4);
    }

    #[test]
    fn clicking_an_entry_starts_it() {
        let (mut menu, selection, mut world) = menu_with_levels(vec![level(1, None), level(2, None)]);
        let (x, y) = menu.entry_rect(1).center();
        let click = InputSnapshot::empty()
            .with_cursor_position_px(Some(Vec2::new(x as f32, y as f32)))
            .with_left_click_pressed(true);
        let command = menu.update(1.0 / 60.0, &click, &mut world);
        assert_eq!(command, SceneCommand::HardResetTo(SceneKey::Gameplay));
        assert_eq!(selection.get(), 2);
    }

    #[test]
    fn escape_quits_and_empty_menu_ignores_confirm() {
        let (mut menu, _, mut world) = menu_with_levels(Vec::new());
        let confirm = InputSnapshot::empty().with_confirm_pressed(true);
        assert_eq!(menu.update(1.0 / 60.0, &confirm, &mut world), SceneCommand::None);
        let back = InputSnapshot::empty().with_back_pressed(true);
        assert_eq!(menu.update(1.0 / 60.0, &back, &mut world), SceneCommand::Quit);
    }
}
