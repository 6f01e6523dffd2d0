use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// State directory under $HOME/.local/state/guessr, or the platform data dir
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("guessr"),
            )
        } else {
            ProjectDirs::from("", "", "guessr")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("history.db"))
    }

    pub fn log_dir() -> Option<PathBuf> {
        Self::state_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_share_the_state_dir() {
        if let (Some(state), Some(db), Some(log)) =
            (AppDirs::state_dir(), AppDirs::db_path(), AppDirs::log_dir())
        {
            assert!(db.starts_with(&state));
            assert_eq!(db.file_name().unwrap(), "history.db");
            assert_eq!(log, state);
        }
    }
}
