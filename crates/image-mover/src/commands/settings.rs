use image_mover_core::{ImageMoverPlugin, Settings};

/// Print the current settings, or persist a new log path first.
pub async fn execute(plugin: &ImageMoverPlugin, log_path: Option<String>) -> anyhow::Result<Settings> {
    if let Some(log_path) = log_path {
        let mut settings = plugin.settings();
        settings.log_path = log_path;
        plugin.update_settings(settings).await?;
    }
    Ok(plugin.settings())
}
