use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use community_view::theme::Theme;

const FILE_NAME: &str = "state.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    theme: Theme,
}

/// Small JSON file holding client preferences across runs.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(FILE_NAME) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored theme, or the default when nothing usable is stored.
    pub fn load_theme(&self) -> Theme {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No state file at {}, using defaults", self.path.display());
                return Theme::default();
            }
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                return Theme::default();
            }
        };

        match serde_json::from_str::<PersistedState>(&raw) {
            Ok(state) => state.theme,
            Err(e) => {
                warn!("Corrupt state file {}: {}", self.path.display(), e);
                Theme::default()
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating state dir {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&PersistedState { theme })?;
        fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(StateFile::in_dir(dir.path()).load_theme(), Theme::Dark);
    }

    #[test]
    fn saved_theme_is_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateFile::in_dir(dir.path().join("nested"));
        store.save_theme(Theme::Light).unwrap();

        assert_eq!(store.load_theme(), Theme::Light);
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(r#""theme": "light""#));
    }

    #[test]
    fn corrupt_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateFile::in_dir(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load_theme(), Theme::Dark);
    }
}
