pub mod check;
pub mod play;

use std::path::Path;

use cl_core::SceneFile;

/// Load a scene file, mapping errors to a message naming the path.
fn load_scene(path: &Path) -> Result<SceneFile, String> {
    SceneFile::load(path).map_err(|e| format!("cannot load '{}': {e}", path.display()))
}
