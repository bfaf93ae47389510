use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "spelldrill";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Persisted word list, settings and lock live here.
    pub fn config_file(name: &str) -> PathBuf {
        match ProjectDirs::from("", "", APP_NAME) {
            Some(pd) => pd.config_dir().join(name),
            None => PathBuf::from(format!("{APP_NAME}_{name}")),
        }
    }

    /// Log output goes under $HOME/.local/state when available.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME);
            Some(state_dir.join("spelldrill.log"))
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().join("spelldrill.log"))
        }
    }
}
