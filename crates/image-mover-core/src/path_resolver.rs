use crate::error::RelocateError;
use std::path::{Path, PathBuf};

/// The only reference shape that gets relocated.
pub const IMAGE_DIR_PREFIX: &str = "images/";

/// Where an embedded image lives now and where it has to go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Reference as written in the document, e.g. "images/x.png"
    pub reference: String,
    pub from: PathBuf,
    pub to: PathBuf,
}

impl ResolvedImage {
    /// True when the note stayed in the same directory.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Directory segments of a vault path, i.e. everything but the file name.
///
/// Example: `directory_of("B/A/A.md")` → `["B", "A"]`
pub fn directory_of(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop();
    segments
}

pub fn is_supported_reference(reference: &str) -> bool {
    reference.starts_with(IMAGE_DIR_PREFIX)
}

/// Compute the absolute old and new locations of `reference` for a note that
/// moved from `old_path` to `new_path`.
///
/// Relative-parent references (`../images/x.png`) and anything else not under
/// `images/` are rejected.
pub fn resolve_image(
    base: &Path,
    old_path: &str,
    new_path: &str,
    reference: &str,
) -> Result<ResolvedImage, RelocateError> {
    if !is_supported_reference(reference) {
        return Err(RelocateError::UnsupportedReference(reference.to_string()));
    }

    Ok(ResolvedImage {
        reference: reference.to_string(),
        from: join_vault_path(base, &directory_of(old_path), reference),
        to: join_vault_path(base, &directory_of(new_path), reference),
    })
}

fn join_vault_path(base: &Path, dir: &[&str], reference: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for segment in dir {
        path.push(segment);
    }
    for segment in reference.split('/') {
        if !segment.is_empty() && segment != "." {
            path.push(segment);
        }
    }
    path
}
