use crate::error::RelocateError;
use crate::host::Notifier;
use crate::report::Relocation;
use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

pub const CREATE_DIR_NOTICE: Duration = Duration::from_millis(1000);
pub const FAILURE_NOTICE: Duration = Duration::from_millis(3000);

/// Move one image file, creating the destination folder first if needed.
///
/// Only the immediate parent of `to` is created. Nothing is retried and a
/// folder created here is left in place when the move itself fails.
pub async fn relocate<N: Notifier + ?Sized>(
    from: &Path,
    to: &Path,
    notifier: &N,
) -> Result<Relocation, RelocateError> {
    let created_dir = match to.parent() {
        Some(dir) => ensure_dir(dir, notifier).await?,
        None => false,
    };

    // rename(2) silently replaces an existing file
    if fs::try_exists(to).await.unwrap_or(false) {
        return Err(RelocateError::DestinationExists {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
    }

    fs::rename(from, to)
        .await
        .map_err(|source| RelocateError::Move {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })?;

    tracing::info!("Image moved from {} to {}", from.display(), to.display());

    Ok(Relocation {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        created_dir,
    })
}

/// Returns true when this call created the directory.
async fn ensure_dir<N: Notifier + ?Sized>(dir: &Path, notifier: &N) -> Result<bool, RelocateError> {
    if fs::try_exists(dir).await.unwrap_or(false) {
        return Ok(false);
    }

    match fs::create_dir(dir).await {
        Ok(()) => {
            tracing::info!("Created {}", dir.display());
            notifier.notice(&format!("Created {}", dir.display()), CREATE_DIR_NOTICE);
            Ok(true)
        }
        // Another relocation for the same note got there first
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(source) => Err(RelocateError::CreateDir {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
