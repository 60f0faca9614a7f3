mod commands;
mod fs_host;
mod watcher;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fs_host::FsHost;
use image_mover_core::ImageMoverPlugin;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "image-mover", version, about)]
struct Opts {
    /// Vault root directory
    #[arg(long, env = "IMAGE_MOVER_VAULT", default_value = ".")]
    vault: PathBuf,

    /// Directory holding the plugin's data.json (default: <vault>/.image-mover)
    #[arg(long, env = "IMAGE_MOVER_PLUGIN_DIR")]
    plugin_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Move a note and bring its images along
    Move {
        /// Current vault path of the note, e.g. "B/A/A.md"
        from: String,
        /// New vault path of the note, e.g. "C/A.md"
        to: String,
    },

    /// Watch the vault and relocate images whenever a note is renamed
    ///
    /// Needs a watcher backend that reports both paths of a rename in one
    /// event, which currently means Linux (inotify). On other platforms use
    /// `move` instead.
    Watch,

    /// Show the persisted settings, or change them
    Settings {
        /// New log directory, relative to the plugin directory unless absolute
        #[arg(long)]
        log_path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();

    let vault = tokio::fs::canonicalize(&opts.vault)
        .await
        .with_context(|| format!("vault directory {} not found", opts.vault.display()))?;
    let plugin_dir = opts
        .plugin_dir
        .unwrap_or_else(|| vault.join(".image-mover"));

    let host = Arc::new(FsHost::new(vault.clone(), &plugin_dir));
    let plugin = ImageMoverPlugin::load(host.clone(), &plugin_dir).await?;

    match opts.command {
        Command::Move { from, to } => {
            match commands::move_note::execute(&host, &plugin, &from, &to).await? {
                Some(report) => commands::print_report(&report),
                None => println!("Moved {} -> {} (not a note, no images to move)", from, to),
            }
        }
        Command::Watch => {
            commands::watch::execute(&plugin, &vault).await?;
        }
        Command::Settings { log_path } => {
            let settings = commands::settings::execute(&plugin, log_path).await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            println!("log file: {}", plugin.logger().file_path().display());
            println!("data file: {}", host.data_file().display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn watch_help_names_supported_platform() {
        let cli = Opts::command();
        let watch = cli.find_subcommand("watch").unwrap();
        let help = watch.get_long_about().unwrap().to_string();
        assert!(help.contains("Linux"), "{help}");
    }
}
