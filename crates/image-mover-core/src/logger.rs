use crate::error::LogError;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub const LOG_FILE_NAME: &str = "log.txt";

/// Append-only text log: one `<timestamp> <json>` line per entry.
///
/// There is no queue and no lock. Each entry is a single `write_all` on a file
/// opened in append mode, so concurrent entries may land in any order.
#[derive(Clone, Debug)]
pub struct Logger {
    dir: PathBuf,
}

impl Logger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE_NAME)
    }

    /// Append `body` as JSON, creating the log directory if needed.
    pub async fn log<T: Serialize + ?Sized>(&self, body: &T) -> Result<(), LogError> {
        let line = format_entry(Local::now(), body)?;

        if !fs::try_exists(&self.dir).await.unwrap_or(false) {
            fs::create_dir_all(&self.dir)
                .await
                .map_err(|source| LogError::CreateDir {
                    path: self.dir.clone(),
                    source,
                })?;
        }

        let path = self.file_path();
        let append_err = |source| LogError::Append {
            path: path.clone(),
            source,
        };
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(append_err)?;
        file.write_all(line.as_bytes()).await.map_err(append_err)?;
        file.flush().await.map_err(append_err)?;
        Ok(())
    }
}

fn format_entry<T: Serialize + ?Sized>(
    now: DateTime<Local>,
    body: &T,
) -> Result<String, LogError> {
    Ok(format!(
        "{} {}\n",
        locale_timestamp(now),
        serde_json::to_string(body)?
    ))
}

/// en-US style locale string, e.g. "3/7/2024, 9:05:01 PM".
fn locale_timestamp(now: DateTime<Local>) -> String {
    now.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}
