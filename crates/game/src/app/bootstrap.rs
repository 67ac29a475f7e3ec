use std::rc::Rc;

use coast_engine::{
    load_def_database, resolve_app_paths, AppError, AssetStore, DefDatabase, LoopConfig, Rect,
    Scene,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::GameplayScene;
use super::menu::MainMenuScene;
use super::settings::{load_settings_or_default, settings_path};
use super::{
    GameContent, LevelSelection, MENU_BACKGROUND_IMAGE_KEY, MENU_FONT_KEY, PLAYER_IMAGE_KEY,
    TITLE_FONT_KEY, UI_FONT_KEY,
};

const UI_FONT_SCALE: i32 = 3;
const MENU_FONT_SCALE: i32 = 5;
const TITLE_FONT_SCALE: i32 = 8;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) main_menu: Box<dyn Scene>,
    pub(crate) gameplay: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Coast Guardian Startup ===");

    let app_paths = resolve_app_paths()?;
    let settings = load_settings_or_default(&settings_path(&app_paths.root));
    let mut config = LoopConfig::default();
    settings.apply_to(&mut config);

    let defs = load_def_database(&app_paths)?;
    let mut assets = AssetStore::new(&app_paths.assets_dir);
    preload_images(&mut assets, &defs);
    assets.register_font(UI_FONT_KEY, UI_FONT_SCALE);
    assets.register_font(MENU_FONT_KEY, MENU_FONT_SCALE);
    assets.register_font(TITLE_FONT_KEY, TITLE_FONT_SCALE);

    let first_level = defs.levels().next().map_or(1, |level| level.number);
    let selection = LevelSelection::new(settings.start_level.unwrap_or(first_level));
    let bounds = Rect::new(0, 0, config.window_width as i32, config.window_height as i32);
    let content = Rc::new(GameContent { defs, assets });

    let main_menu = MainMenuScene::new(Rc::clone(&content), selection.clone(), bounds);
    let gameplay = GameplayScene::new(content, selection, bounds);

    Ok(AppWiring {
        config,
        main_menu: Box::new(main_menu),
        gameplay: Box::new(gameplay),
    })
}

/// Loads every image the definitions mention plus the fixed sprites. Failures are
/// logged and leave the key missing, which renders as a placeholder.
fn preload_images(assets: &mut AssetStore, defs: &DefDatabase) {
    let mut keys = defs.image_keys();
    keys.push(PLAYER_IMAGE_KEY.to_string());
    keys.push(MENU_BACKGROUND_IMAGE_KEY.to_string());

    let mut failed = 0usize;
    for key in &keys {
        if let Err(error) = assets.load_image(key) {
            failed += 1;
            warn!(key = %key, error = %error, "image_load_failed");
        }
    }
    info!(
        requested = keys.len(),
        loaded = assets.image_count(),
        failed,
        "images_preloaded"
    );
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
