use crate::error::RelocateError;
use crate::path_resolver::ResolvedImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A successful image move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    pub from: PathBuf,
    pub to: PathBuf,
    /// Whether the destination folder had to be created first
    pub created_dir: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Unsupported,
    CreateDir,
    Move,
}

/// One image reference that was not relocated. This is also the shape written
/// to the log file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveFailure {
    /// Vault path of the note after the rename
    pub document: String,
    pub reference: String,
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<PathBuf>,
    pub error: String,
}

impl MoveFailure {
    /// Build a failure record. `attempted` carries the resolved paths when the
    /// reference got far enough to be resolved.
    pub fn new(
        document: &str,
        reference: &str,
        err: &RelocateError,
        attempted: Option<&ResolvedImage>,
    ) -> Self {
        let kind = match err {
            RelocateError::UnsupportedReference(_) => FailureKind::Unsupported,
            RelocateError::CreateDir { .. } => FailureKind::CreateDir,
            RelocateError::DestinationExists { .. } | RelocateError::Move { .. } => {
                FailureKind::Move
            }
        };
        Self {
            document: document.to_string(),
            reference: reference.to_string(),
            kind,
            from: attempted.map(|r| r.from.clone()),
            to: attempted.map(|r| r.to.clone()),
            error: err.to_string(),
        }
    }
}

/// Outcome of handling one rename notification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RenameReport {
    pub document: String,
    pub old_path: String,
    pub moved: Vec<Relocation>,
    pub failures: Vec<MoveFailure>,
    /// References that needed no move because the note kept its directory
    pub skipped: usize,
}

impl RenameReport {
    pub fn new(document: &str, old_path: &str) -> Self {
        Self {
            document: document.to_string(),
            old_path: old_path.to_string(),
            ..Default::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn unsupported_failure_has_no_paths() {
        let err = RelocateError::UnsupportedReference("../images/b.png".into());
        let failure = MoveFailure::new("C/A.md", "../images/b.png", &err, None);

        assert_eq!(failure.kind, FailureKind::Unsupported);
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["kind"], "unsupported");
        assert!(json.get("from").is_none());
        assert!(json.get("to").is_none());
    }

    #[test]
    fn move_failure_records_attempted_paths() {
        let resolved = ResolvedImage {
            reference: "images/x.png".into(),
            from: PathBuf::from("/vault/B/images/x.png"),
            to: PathBuf::from("/vault/C/images/x.png"),
        };
        let err = RelocateError::Move {
            from: resolved.from.clone(),
            to: resolved.to.clone(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let failure = MoveFailure::new("C/A.md", "images/x.png", &err, Some(&resolved));

        assert_eq!(failure.kind, FailureKind::Move);
        assert_eq!(failure.from.as_deref(), Some(resolved.from.as_path()));
        assert_eq!(failure.to.as_deref(), Some(resolved.to.as_path()));
        assert!(failure.error.contains("/vault/B/images/x.png"));
    }

    #[test]
    fn directory_failure_is_its_own_kind() {
        let err = RelocateError::CreateDir {
            path: PathBuf::from("/vault/C/images"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let failure = MoveFailure::new("C/A.md", "images/x.png", &err, None);
        assert_eq!(serde_json::to_value(&failure).unwrap()["kind"], "create_dir");
    }
}
