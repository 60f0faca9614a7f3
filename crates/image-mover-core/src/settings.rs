use crate::host::DataStore;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_LOG_PATH: &str = "./logs";

/// Persisted plugin settings.
///
/// Stored through the host's [`DataStore`] as `{"logPath": "..."}`. Missing
/// fields fall back to their defaults on load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Log directory. Relative paths are taken from the plugin's own directory.
    pub log_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_path: DEFAULT_LOG_PATH.to_string(),
        }
    }
}

impl Settings {
    pub async fn load<S: DataStore + ?Sized>(store: &S) -> anyhow::Result<Self> {
        let Some(data) = store.load_data().await? else {
            return Ok(Self::default());
        };

        if !data.is_object() {
            tracing::warn!("Ignoring persisted settings that are not an object: {}", data);
            return Ok(Self::default());
        }

        serde_json::from_value(data).context("invalid persisted settings")
    }

    pub async fn save<S: DataStore + ?Sized>(&self, store: &S) -> anyhow::Result<()> {
        let data = serde_json::to_value(self)?;
        store.save_data(&data).await
    }

    /// Absolute log directory for a plugin installed at `plugin_dir`.
    pub fn log_dir(&self, plugin_dir: &Path) -> PathBuf {
        let log_path = Path::new(&self.log_path);
        if log_path.is_absolute() {
            return log_path.to_path_buf();
        }

        let mut dir = plugin_dir.to_path_buf();
        for component in log_path.components() {
            match component {
                Component::CurDir => {}
                other => dir.push(other),
            }
        }
        dir
    }
}
