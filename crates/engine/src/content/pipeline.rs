use thiserror::Error;
use tracing::info;

use crate::AppPaths;

use super::compiler::{compile_def_database, ContentCompileError};
use super::database::DefDatabase;

#[derive(Debug, Error)]
pub enum ContentPipelineError {
    #[error(transparent)]
    Compile(#[from] ContentCompileError),
}

/// Compiles the defs directory under `app_paths` and logs a summary of what was loaded.
pub fn load_def_database(app_paths: &AppPaths) -> Result<DefDatabase, ContentPipelineError> {
    let database = compile_def_database(&app_paths.defs_dir)?;
    info!(
        defs_dir = %app_paths.defs_dir.display(),
        weapon_count = database.weapons().count(),
        monster_count = database.monsters().count(),
        level_count = database.levels().count(),
        "content_loaded"
    );
    Ok(database)
}
