use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::entry::RemoteEntry;
use crate::error::BrowseError;
use crate::session::DriveSession;

/// Fetches the full content of one file. No ranges, no retry.
pub async fn download(session: &DriveSession, file_id: &str) -> Result<Vec<u8>, BrowseError> {
    Ok(session.transport()?.download(file_id).await?)
}

pub async fn delete(session: &DriveSession, file_id: &str) -> Result<(), BrowseError> {
    session.transport()?.delete(file_id).await?;
    info!(%file_id, "deleted drive file");
    Ok(())
}

/// Downloads `entry` into `dir`, named after the entry, and returns the
/// written path. The file only appears under its final name once complete.
pub async fn download_entry_to(
    session: &DriveSession,
    entry: &RemoteEntry,
    dir: &Path,
) -> Result<PathBuf, BrowseError> {
    let entry = entry.actionable()?;
    let file_name = entry
        .name
        .as_deref()
        .map(sanitize_file_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| entry.id.clone());
    let content = download(session, &entry.id).await?;

    let target = dir.join(&file_name);
    let partial = dir.join(format!("{file_name}.partial"));
    write_file(&partial, &content)
        .await
        .map_err(|source| BrowseError::LocalWrite {
            path: partial.clone(),
            source,
        })?;
    tokio::fs::rename(&partial, &target)
        .await
        .map_err(|source| BrowseError::LocalWrite {
            path: target.clone(),
            source,
        })?;
    Ok(target)
}

async fn write_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_all().await
}

// Remote names may contain separators.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|ch| if matches!(ch, '/' | '\\') { '_' } else { ch })
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}
