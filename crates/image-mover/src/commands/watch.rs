use super::print_failures;
use crate::watcher::watch_renames;
use image_mover_core::ImageMoverPlugin;
use std::path::Path;
use std::sync::Arc;

/// Handle renames under `base` until Ctrl-C, then report every failure seen.
pub async fn execute(plugin: &Arc<ImageMoverPlugin>, base: &Path) -> anyhow::Result<()> {
    let (watcher, events) = watch_renames(base)?;
    let subscription = plugin.subscribe(events);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Stopping, {} rename(s) still in flight", plugin.in_flight());

    drop(watcher);
    subscription.unsubscribe().await;

    print_failures(&plugin.failures());
    Ok(())
}
