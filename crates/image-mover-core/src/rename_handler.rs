use crate::error::HandlerError;
use crate::host::{Host, RenameEvent, VaultFile};
use crate::link_parser::extract_image_references;
use crate::logger::Logger;
use crate::path_resolver::{resolve_image, ResolvedImage};
use crate::relocator::{relocate, FAILURE_NOTICE};
use crate::report::{MoveFailure, Relocation, RenameReport};
use dashmap::DashMap;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::Instant;

pub const MARKDOWN_EXTENSION: &str = "md";

/// Reacts to note renames by moving the note's `images/` embeds along with it.
///
/// Each call to [`RenameHandler::on_rename`] is independent. Calls for
/// different notes may run concurrently; they are assumed never to touch the
/// same image files.
pub struct RenameHandler {
    host: Arc<dyn Host>,
    /// Notes currently being handled, keyed by new path
    in_flight: DashMap<String, InFlight>,
}

struct InFlight {
    handlers: usize,
    started: Instant,
}

impl RenameHandler {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            host,
            in_flight: DashMap::new(),
        }
    }

    pub fn should_handle(file: &VaultFile) -> bool {
        file.extension == MARKDOWN_EXTENSION
    }

    /// Number of notes whose images are being moved right now.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Handle one rename notification.
    ///
    /// Returns `Ok(None)` for files that are not markdown notes. Per-image
    /// failures never surface as `Err`; they are collected in the report and
    /// written to `logger`.
    pub async fn on_rename(
        &self,
        event: &RenameEvent,
        logger: &Logger,
    ) -> Result<Option<RenameReport>, HandlerError> {
        if !Self::should_handle(&event.file) {
            tracing::debug!("Ignoring rename of non-markdown file {}", event.file.path);
            return Ok(None);
        }

        self.begin(&event.file.path);
        let result = self.handle_file_move(event, logger).await;
        self.finish(&event.file.path);

        result.map(Some)
    }

    fn begin(&self, path: &str) {
        self.in_flight
            .entry(path.to_string())
            .and_modify(|entry| entry.handlers += 1)
            .or_insert_with(|| InFlight {
                handlers: 1,
                started: Instant::now(),
            });
    }

    fn finish(&self, path: &str) {
        let removed = self.in_flight.remove_if_mut(path, |_, entry| {
            entry.handlers -= 1;
            entry.handlers == 0
        });
        if let Some((path, entry)) = removed {
            tracing::debug!("Handled {} in {:?}", path, entry.started.elapsed());
        }
    }

    async fn handle_file_move(
        &self,
        event: &RenameEvent,
        logger: &Logger,
    ) -> Result<RenameReport, HandlerError> {
        let document = event.file.path.as_str();
        let content = self
            .host
            .read(&event.file)
            .await
            .map_err(|cause| HandlerError::Read {
                path: document.to_string(),
                cause,
            })?;

        let mut report = RenameReport::new(document, &event.old_path);
        let references = extract_image_references(&content);
        if references.is_empty() {
            return Ok(report);
        }

        tracing::info!(
            "Rename {} -> {}: {} image reference(s)",
            event.old_path,
            document,
            references.len()
        );

        let mut seen = HashSet::new();
        let mut pending: Vec<ResolvedImage> = Vec::new();
        for reference in references {
            match resolve_image(self.host.base_path(), &event.old_path, document, &reference) {
                Ok(resolved) if resolved.is_noop() => report.skipped += 1,
                Ok(resolved) => {
                    if seen.insert(resolved.from.clone()) {
                        pending.push(resolved);
                    }
                }
                Err(err) => {
                    tracing::info!("Not moving unsupported image path {}", reference);
                    self.host
                        .notice(&format!("Unsupported image path: {}", reference), FAILURE_NOTICE);
                    let failure = MoveFailure::new(document, &reference, &err, None);
                    record_failure(logger, &failure).await;
                    report.failures.push(failure);
                }
            }
        }

        let outcomes = join_all(
            pending
                .iter()
                .map(|resolved| self.relocate_one(document, resolved, logger)),
        )
        .await;

        for outcome in outcomes {
            match outcome {
                Ok(relocation) => report.moved.push(relocation),
                Err(failure) => report.failures.push(failure),
            }
        }

        Ok(report)
    }

    async fn relocate_one(
        &self,
        document: &str,
        resolved: &ResolvedImage,
        logger: &Logger,
    ) -> Result<Relocation, MoveFailure> {
        let host: &dyn Host = &*self.host;
        match relocate(&resolved.from, &resolved.to, host).await {
            Ok(relocation) => Ok(relocation),
            Err(err) => {
                tracing::error!("{}", err);
                host.notice(
                    &format!(
                        "Failed to move image from {} to {}",
                        resolved.from.display(),
                        resolved.to.display()
                    ),
                    FAILURE_NOTICE,
                );
                let failure = MoveFailure::new(document, &resolved.reference, &err, Some(resolved));
                record_failure(logger, &failure).await;
                Err(failure)
            }
        }
    }
}

async fn record_failure(logger: &Logger, failure: &MoveFailure) {
    if let Err(e) = logger.log(failure).await {
        tracing::error!("Failed to write {}: {}", logger.file_path().display(), e);
    }
}
