use std::path::{Path, PathBuf};

use gdrive_core::NewFile;
use tracing::{debug, info};

use crate::error::BrowseError;
use crate::listing::find_folder;
use crate::session::DriveSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Destination folder, matched by name at a single level.
    pub folder_name: String,
    pub local_path: PathBuf,
    pub mime_type: String,
}

impl UploadRequest {
    pub fn new(
        folder_name: impl Into<String>,
        local_path: impl Into<PathBuf>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            folder_name: folder_name.into(),
            local_path: local_path.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Base name of the local file, used as the remote entry name.
    pub fn remote_name(&self) -> String {
        remote_name(&self.local_path)
    }
}

fn remote_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Uploads a local file into the folder named by the request, creating the
/// folder when none matches. Returns the new file's identifier.
///
/// The local file is read before anything is sent, so an unreadable file
/// never leaves a freshly created folder behind. When several folders match,
/// the choice follows [`find_folder`]. Nothing is retried.
pub async fn upload_to_folder(
    session: &DriveSession,
    request: &UploadRequest,
) -> Result<String, BrowseError> {
    session.ensure_active()?;
    let content = tokio::fs::read(&request.local_path)
        .await
        .map_err(|source| BrowseError::LocalRead {
            path: request.local_path.clone(),
            source,
        })?;

    let parent_id = match find_folder(session, &request.folder_name).await? {
        Some(folder) => {
            debug!(folder = %request.folder_name, id = %folder.id, "upload folder found");
            folder.id
        }
        None => {
            let id = session
                .transport()?
                .create_folder(&request.folder_name)
                .await?;
            info!(folder = %request.folder_name, %id, "created upload folder");
            id
        }
    };

    let file = NewFile {
        name: request.remote_name(),
        parent_id,
        mime_type: request.mime_type.clone(),
        content,
    };
    let id = session.transport()?.upload(&file).await?;
    info!(
        name = %file.name,
        parent = %file.parent_id,
        bytes = file.content.len(),
        %id,
        "uploaded file"
    );
    Ok(id)
}
