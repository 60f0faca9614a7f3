use crate::host::{Host, RenameEvent};
use crate::logger::Logger;
use crate::rename_handler::RenameHandler;
use crate::report::{MoveFailure, RenameReport};
use crate::settings::Settings;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

/// The plugin as the host sees it: load, subscribe, update settings, unload.
pub struct ImageMoverPlugin {
    host: Arc<dyn Host>,
    plugin_dir: PathBuf,
    settings: RwLock<Settings>,
    logger: RwLock<Arc<Logger>>,
    handler: RenameHandler,
    /// Every failure seen since load, in the order it happened. Never pruned.
    failures: Mutex<Vec<MoveFailure>>,
}

impl ImageMoverPlugin {
    /// Read persisted settings and set up the logger. Nothing is subscribed yet.
    pub async fn load(host: Arc<dyn Host>, plugin_dir: impl Into<PathBuf>) -> anyhow::Result<Arc<Self>> {
        let plugin_dir = plugin_dir.into();
        let settings = Settings::load(&*host).await?;
        let logger = Logger::new(settings.log_dir(&plugin_dir));

        tracing::info!(
            "Image mover loaded for vault {} (log dir {})",
            host.base_path().display(),
            logger.dir().display()
        );

        Ok(Arc::new(Self {
            handler: RenameHandler::new(host.clone()),
            host,
            plugin_dir,
            settings: RwLock::new(settings),
            logger: RwLock::new(Arc::new(logger)),
            failures: Mutex::new(Vec::new()),
        }))
    }

    pub fn plugin_dir(&self) -> &Path {
        &self.plugin_dir
    }

    pub fn settings(&self) -> Settings {
        self.settings.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn logger(&self) -> Arc<Logger> {
        self.logger.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Persist new settings and point the logger at the new directory.
    /// Renames already in progress keep logging to the old one.
    pub async fn update_settings(&self, settings: Settings) -> anyhow::Result<()> {
        settings.save(&*self.host).await?;

        let logger = Arc::new(Logger::new(settings.log_dir(&self.plugin_dir)));
        tracing::info!("Log directory is now {}", logger.dir().display());
        *self.logger.write().unwrap_or_else(|e| e.into_inner()) = logger;
        *self.settings.write().unwrap_or_else(|e| e.into_inner()) = settings;
        Ok(())
    }

    /// Handle a single rename notification and remember its failures.
    pub async fn on_rename(&self, event: RenameEvent) -> Option<RenameReport> {
        let logger = self.logger();
        match self.handler.on_rename(&event, &logger).await {
            Ok(Some(report)) => {
                if !report.failures.is_empty() {
                    self.failures
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .extend(report.failures.iter().cloned());
                }
                Some(report)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::error!("Rename {} -> {} not handled: {}", event.old_path, event.file.path, e);
                None
            }
        }
    }

    /// All failures recorded since load, oldest first.
    pub fn failures(&self) -> Vec<MoveFailure> {
        self.failures.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn in_flight(&self) -> usize {
        self.handler.in_flight()
    }

    /// Start receiving rename notifications.
    ///
    /// Notifications are received one at a time, but each one is handled on
    /// its own task, so renames of different notes can overlap.
    pub fn subscribe(self: &Arc<Self>, mut events: mpsc::Receiver<RenameEvent>) -> Subscription {
        let plugin = Arc::clone(self);
        let tracker = TaskTracker::new();
        let task_tracker = tracker.clone();

        let worker = tokio::spawn(async move {
            tracing::info!("Rename subscription started");
            while let Some(event) = events.recv().await {
                let plugin = Arc::clone(&plugin);
                task_tracker.spawn(async move {
                    plugin.on_rename(event).await;
                });
            }
            tracing::info!("Rename subscription closed");
        });

        Subscription { worker, tracker }
    }
}

/// Handle for an active rename subscription. Dropping it stops receiving new
/// notifications; handling that already started still runs to completion.
pub struct Subscription {
    worker: JoinHandle<()>,
    tracker: TaskTracker,
}

impl Subscription {
    /// Stop receiving and wait for started handling to finish.
    pub async fn unsubscribe(mut self) {
        self.worker.abort();
        // Resolves once the worker, and with it the receiver, is dropped
        let _ = (&mut self.worker).await;
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Wait for the notification channel to close and all handling to finish.
    pub async fn drain(&mut self) {
        if let Err(e) = (&mut self.worker).await {
            if !e.is_cancelled() {
                tracing::error!("Rename subscription worker failed: {}", e);
            }
        }
        self.tracker.close();
        self.tracker.wait().await;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::test_support::TestHost;
    use crate::report::FailureKind;
    use serde_json::json;

    async fn load(host: &Arc<TestHost>) -> Arc<ImageMoverPlugin> {
        let plugin_dir = host.dir.path().join(".plugins/image-mover");
        ImageMoverPlugin::load(host.clone(), plugin_dir).await.unwrap()
    }

    #[tokio::test]
    async fn load_uses_default_log_dir() {
        let host = Arc::new(TestHost::new());
        let plugin = load(&host).await;

        assert_eq!(plugin.settings(), Settings::default());
        assert_eq!(
            plugin.logger().dir(),
            host.dir.path().join(".plugins/image-mover/logs")
        );
    }

    #[tokio::test]
    async fn load_reads_persisted_log_path() {
        let host = Arc::new(TestHost::new());
        *host.data.lock().unwrap() = Some(json!({"logPath": "custom"}));

        let plugin = load(&host).await;

        assert!(plugin.logger().dir().ends_with(".plugins/image-mover/custom"));
    }

    #[tokio::test]
    async fn update_settings_persists_and_moves_log() {
        let host = Arc::new(TestHost::new());
        let plugin = load(&host).await;
        let new_dir = host.dir.path().join("elsewhere");

        plugin
            .update_settings(Settings {
                log_path: new_dir.to_string_lossy().into_owned(),
            })
            .await
            .unwrap();

        assert_eq!(plugin.logger().dir(), new_dir);
        assert_eq!(
            host.data.lock().unwrap().clone().unwrap()["logPath"],
            json!(new_dir.to_string_lossy())
        );
    }

    #[tokio::test]
    async fn failures_accumulate_across_renames() {
        let host = Arc::new(TestHost::new());
        let plugin = load(&host).await;
        host.write("A/one.md", "![a](../images/a.png)");
        host.write("A/two.md", "![b](images/missing.png)");

        plugin.on_rename(RenameEvent::new("one.md", "A/one.md")).await.unwrap();
        plugin.on_rename(RenameEvent::new("two.md", "A/two.md")).await.unwrap();

        let failures = plugin.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].document, "A/one.md");
        assert_eq!(failures[0].kind, FailureKind::Unsupported);
        assert_eq!(failures[1].document, "A/two.md");
        assert_eq!(failures[1].kind, FailureKind::Move);

        let log = std::fs::read_to_string(plugin.logger().file_path()).unwrap();
        assert_eq!(log.lines().count(), 2);
    }

    #[tokio::test]
    async fn failures_keep_the_order_they_happened_in() {
        let host = Arc::new(TestHost::new());
        let plugin = load(&host).await;
        host.write("Z/z.md", "![z](../images/first.png)");
        host.write("A/a.md", "![a](../images/second.png)");

        plugin.on_rename(RenameEvent::new("z.md", "Z/z.md")).await.unwrap();
        plugin.on_rename(RenameEvent::new("a.md", "A/a.md")).await.unwrap();

        let references: Vec<_> = plugin
            .failures()
            .into_iter()
            .map(|f| f.reference)
            .collect();
        assert_eq!(references, ["../images/first.png", "../images/second.png"]);
    }

    #[tokio::test]
    async fn subscription_handles_events_until_channel_closes() {
        let host = Arc::new(TestHost::new());
        let plugin = load(&host).await;
        host.write("Old/images/a.png", "a");
        host.write("Old/images/b.png", "b");
        host.write("New/a.md", "![a](images/a.png)");
        host.write("Other/b.md", "![b](images/b.png)");

        let (tx, rx) = mpsc::channel(8);
        let mut subscription = plugin.subscribe(rx);
        tx.send(RenameEvent::new("Old/a.md", "New/a.md")).await.unwrap();
        tx.send(RenameEvent::new("Old/b.md", "Other/b.md")).await.unwrap();
        tx.send(RenameEvent::new("Old/c.png", "New/c.png")).await.unwrap();
        drop(tx);

        subscription.drain().await;

        assert!(host.exists("New/images/a.png"));
        assert!(host.exists("Other/images/b.png"));
        assert!(plugin.failures().is_empty());
        assert_eq!(plugin.in_flight(), 0);
    }

    #[tokio::test]
    async fn unsubscribe_stops_receiving() {
        let host = Arc::new(TestHost::new());
        let plugin = load(&host).await;
        host.write("Old/images/a.png", "a");
        host.write("New/a.md", "![a](images/a.png)");

        let (tx, rx) = mpsc::channel(8);
        let subscription = plugin.subscribe(rx);
        subscription.unsubscribe().await;

        assert!(tx.send(RenameEvent::new("Old/a.md", "New/a.md")).await.is_err());
        assert!(host.exists("Old/images/a.png"));
    }
}
