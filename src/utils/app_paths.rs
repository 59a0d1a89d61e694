use std::path::PathBuf;

pub struct AppPaths;

impl AppPaths {
    /// Per-user data directory, `None` when the platform has none
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("tabview"))
    }

    /// Where log files go. Falls back to the temp dir.
    pub fn log_dir() -> PathBuf {
        Self::data_dir()
            .map(|dir| dir.join("logs"))
            .unwrap_or_else(|| std::env::temp_dir().join("tabview"))
    }
}
