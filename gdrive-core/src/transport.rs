use async_trait::async_trait;

use crate::client::{DriveError, FileList};

/// One page request against the files listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Composed query expression; empty means unrestricted.
    pub query: String,
    /// Field projection, sent verbatim.
    pub fields: String,
    pub page_size: u32,
    pub page_token: Option<String>,
}

/// A file to create in a single upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub name: String,
    pub parent_id: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

/// The remote capability the browsing core is built on.
///
/// [`DriveClient`](crate::DriveClient) is the HTTP implementation; anything
/// that can answer these calls (a proxy, a recorded fixture) can stand in.
#[async_trait]
pub trait DriveTransport: Send + Sync {
    async fn list_page(&self, request: &PageRequest) -> Result<FileList, DriveError>;

    /// Creates a folder and returns its identifier.
    async fn create_folder(&self, name: &str) -> Result<String, DriveError>;

    /// Uploads `file` in one request and returns the new identifier.
    async fn upload(&self, file: &NewFile) -> Result<String, DriveError>;

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, DriveError>;

    async fn delete(&self, file_id: &str) -> Result<(), DriveError>;
}
