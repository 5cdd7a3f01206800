// Filesystem locations for durable client state.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Base data directory (~/.local/share/kesnnur-admin on Linux).
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "kesnnur-admin").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Path to the durable ("remember me") auth token.
pub fn token_path() -> Option<PathBuf> {
    data_dir().map(|dir| token_path_in(&dir))
}

/// Token file location inside an arbitrary directory.
pub fn token_path_in(dir: &std::path::Path) -> PathBuf {
    dir.join("auth_token")
}
