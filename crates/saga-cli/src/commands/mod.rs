pub mod chapters;
pub mod check;
pub mod inventory;
pub mod play;

use std::path::Path;

use saga_core::Script;
use saga_profile::FileStorage;

/// Load a script file, reporting failures as CLI errors.
fn load_script(path: &Path) -> Result<Script, String> {
    Script::from_path(path).map_err(|e| format!("cannot load '{}': {e}", path.display()))
}

/// Open the save directory.
fn open_saves(dir: &Path) -> Result<FileStorage, String> {
    FileStorage::open(dir).map_err(|e| format!("cannot open save directory '{}': {e}", dir.display()))
}
