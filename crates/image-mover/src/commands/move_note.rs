use crate::fs_host::FsHost;
use anyhow::{bail, Context};
use image_mover_core::{ImageMoverPlugin, RenameEvent, RenameReport};

/// Move a note inside the vault, then bring its images along.
///
/// Plays the host's part: the note itself is renamed first and the plugin is
/// notified afterwards, exactly as for a rename done in the editor. Returns
/// `None` when the moved file is not a markdown note.
pub async fn execute(
    host: &FsHost,
    plugin: &ImageMoverPlugin,
    from: &str,
    to: &str,
) -> anyhow::Result<Option<RenameReport>> {
    let from = normalize(from)?;
    let to = normalize(to)?;
    if from == to {
        bail!("source and destination are the same: {}", from);
    }

    let source = host.absolute(&from);
    let target = host.absolute(&to);
    if !tokio::fs::try_exists(&source).await.unwrap_or(false) {
        bail!("Document not found: {}", from);
    }
    if tokio::fs::try_exists(&target).await.unwrap_or(false) {
        bail!("Path '{}' already exists", to);
    }

    if let Some(dir) = target.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    tokio::fs::rename(&source, &target)
        .await
        .with_context(|| format!("moving {} to {}", from, to))?;
    tracing::info!("Moved {} -> {}", from, to);

    Ok(plugin.on_rename(RenameEvent::new(from, to)).await)
}

/// Vault-relative, slash-separated, no leading slash, no `.`/`..` segments.
fn normalize(path: &str) -> anyhow::Result<String> {
    let segments: Vec<&str> = path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    if segments.is_empty() {
        bail!("empty vault path: {:?}", path);
    }
    if segments.contains(&"..") {
        bail!("vault path must not leave the vault: {}", path);
    }
    Ok(segments.join("/"))
}
