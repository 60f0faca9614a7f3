use crate::fs_host::to_vault_path;
use image_mover_core::RenameEvent;
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 256;

/// Watch `base` recursively and forward renames as vault-relative events.
///
/// The returned watcher must be kept alive for as long as events are wanted.
pub fn watch_renames(base: &Path) -> anyhow::Result<(RecommendedWatcher, mpsc::Receiver<RenameEvent>)> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let root = base.to_path_buf();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if let Some(rename) = rename_from_event(&root, &event) {
                    tracing::debug!("Rename detected: {} -> {}", rename.old_path, rename.file.path);
                    if tx.blocking_send(rename).is_err() {
                        tracing::warn!("Rename dropped, subscription is closed");
                    }
                }
            }
            Err(e) => tracing::warn!("Watch error: {}", e),
        },
        Config::default(),
    )?;
    watcher.watch(base, RecursiveMode::Recursive)?;

    tracing::info!("Watching {} for renames", base.display());
    Ok((watcher, rx))
}

/// Translate a notify event into a rename notification.
///
/// Only `RenameMode::Both` carries both paths in one event; the separate
/// `From`/`To` halves some platforms emit are ignored.
pub fn rename_from_event(root: &Path, event: &Event) -> Option<RenameEvent> {
    let EventKind::Modify(ModifyKind::Name(RenameMode::Both)) = event.kind else {
        return None;
    };
    let [from, to]: &[PathBuf; 2] = event.paths.as_slice().try_into().ok()?;

    let old_path = to_vault_path(root, from)?;
    let new_path = to_vault_path(root, to)?;
    Some(RenameEvent::new(old_path, new_path))
}
