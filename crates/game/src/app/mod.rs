use std::cell::Cell;
use std::rc::Rc;

use coast_engine::{AssetStore, DefDatabase};

pub(crate) mod bootstrap;
mod gameplay;
pub(crate) mod loop_runner;
mod menu;
mod settings;

pub(crate) const PLAYER_IMAGE_KEY: &str = "player";
pub(crate) const MENU_BACKGROUND_IMAGE_KEY: &str = "main_menu_bg";
pub(crate) const UI_FONT_KEY: &str = "ui";
pub(crate) const MENU_FONT_KEY: &str = "menu";
pub(crate) const TITLE_FONT_KEY: &str = "title";

/// Definitions and loaded assets shared by both scenes.
#[derive(Debug)]
pub(crate) struct GameContent {
    pub(crate) defs: DefDatabase,
    pub(crate) assets: AssetStore,
}

/// Level number chosen in the menu and read by the gameplay scene when it loads.
#[derive(Debug, Clone)]
pub(crate) struct LevelSelection(Rc<Cell<u32>>);

impl LevelSelection {
    pub(crate) fn new(level_number: u32) -> Self {
        Self(Rc::new(Cell::new(level_number)))
    }

    pub(crate) fn get(&self) -> u32 {
        self.0.get()
    }

    pub(crate) fn set(&self, level_number: u32) {
        self.0.set(level_number);
    }
}
