use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use coast_engine::{
    AssetStore, BitMask, Bitmap, Canvas, Color, DefDatabase, FontHandle, InputAction,
    InputSnapshot, LevelDef, Rect, Scene, SceneCommand, SceneKey, SceneWorld, SizePx, TextAnchor,
    Vec2, WeaponDef, WeaponSpawnDef, WHITE,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{GameContent, LevelSelection, PLAYER_IMAGE_KEY, TITLE_FONT_KEY, UI_FONT_KEY};

const PLAYER_SPEED_PX_PER_TICK: i32 = 5;
const INTERACTION_MARGIN_PX: i32 = 30;
const EQUIP_ICON_LIFT_PX: i32 = 30;
const PROMPT_LIFT_PX: i32 = 60;
const HUD_MARGIN_PX: i32 = 20;
const HUD_LINE_Y_PX: [i32; 3] = [20, 60, 100];
const DEFAULT_PROJECTILE_DIRECTION: Vec2 = Vec2::new(1.0, 0.0);
const EQUIP_PROMPT_TEXT: &str = "Press E to equip";
const UNEQUIP_PROMPT_TEXT: &str = "Press E to unequip";
const VICTORY_TEXT: &str = "VICTORY";
const DEFEAT_TEXT: &str = "DEFEAT";
const DEFEAT_COLOR: Color = [235, 90, 70, 255];
const BACKGROUND_FALLBACK_COLOR: Color = [10, 20, 50, 255];
const PLAYER_PLACEHOLDER_COLOR: Color = [80, 170, 255, 255];
const PICKUP_PLACEHOLDER_COLOR: Color = [240, 200, 60, 255];
const MONSTER_PLACEHOLDER_COLOR: Color = [200, 60, 90, 255];
const PROJECTILE_PLACEHOLDER_COLOR: Color = [255, 255, 200, 255];
const LONGEST_TIME_SPAN: Duration = Duration::from_secs(u32::MAX as u64);

include!("types.rs");
include!("player.rs");
include!("collision.rs");
include!("monsters.rs");
include!("scene_state.rs");
include!("scene_impl.rs");

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
