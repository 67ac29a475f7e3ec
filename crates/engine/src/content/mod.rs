mod compiler;
mod database;
mod discovery;
mod pipeline;

pub use compiler::{compile_def_database, ContentCompileError, ContentErrorCode, SourceLocation};
pub use database::{
    DefDatabase, LevelDef, MonsterDef, MonsterSpawnDef, SizePx, WeaponDef, WeaponSpawnDef,
};
pub use pipeline::{load_def_database, ContentPipelineError};
