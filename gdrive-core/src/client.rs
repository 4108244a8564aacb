use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::transport::{DriveTransport, NewFile, PageRequest};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

const BOUNDARY_PREFIX: &str = "gdrive_core_boundary";

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("api returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("api response missing field `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorClass {
    Auth,
    RateLimit,
    Transient,
    Permanent,
}

#[derive(Clone)]
pub struct DriveClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl DriveClient {
    pub fn new(token: impl Into<String>) -> Result<Self, DriveError> {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    /// `base_url` may carry a path prefix (a proxy mount, for instance);
    /// API paths are resolved beneath it.
    pub fn with_base_url(base_url: &str, token: impl Into<String>) -> Result<Self, DriveError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            token: token.into(),
        })
    }

    pub async fn list_files(&self, request: &PageRequest) -> Result<FileList, DriveError> {
        let mut url = self.endpoint("/drive/v3/files")?;
        {
            let mut query = url.query_pairs_mut();
            if !request.query.is_empty() {
                query.append_pair("q", &request.query);
            }
            if !request.fields.is_empty() {
                query.append_pair("fields", &request.fields);
            }
            query.append_pair("pageSize", &request.page_size.to_string());
            if let Some(token) = request.page_token.as_deref() {
                query.append_pair("pageToken", token);
            }
        }
        debug!(page_token = ?request.page_token, "listing drive files");
        let response = self
            .http
            .get(url)
            .header("Authorization", self.auth_header_value())
            .send()
            .await?;
        Self::handle_response(response).await
    }

    pub async fn create_folder(&self, name: &str) -> Result<String, DriveError> {
        let mut url = self.endpoint("/drive/v3/files")?;
        url.query_pairs_mut().append_pair("fields", "id");
        let response = self
            .http
            .post(url)
            .header("Authorization", self.auth_header_value())
            .json(&json!({ "name": name, "mimeType": FOLDER_MIME_TYPE }))
            .send()
            .await?;
        let created: CreatedFile = Self::handle_response(response).await?;
        created.id.ok_or(DriveError::MissingField("id"))
    }

    pub async fn upload_file(&self, file: &NewFile) -> Result<String, DriveError> {
        let mut url = self.endpoint("/upload/drive/v3/files")?;
        url.query_pairs_mut()
            .append_pair("uploadType", "multipart")
            .append_pair("fields", "id");
        let metadata = json!({ "name": file.name, "parents": [file.parent_id] });
        let metadata = serde_json::to_vec(&metadata)?;
        let boundary = multipart_boundary(&metadata, &file.content);
        let body = multipart_related_body(&boundary, &metadata, file);
        let response = self
            .http
            .post(url)
            .header("Authorization", self.auth_header_value())
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;
        let created: CreatedFile = Self::handle_response(response).await?;
        created.id.ok_or(DriveError::MissingField("id"))
    }

    pub async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, DriveError> {
        let mut url = self.file_endpoint(file_id)?;
        url.query_pairs_mut().append_pair("alt", "media");
        let response = self
            .http
            .get(url)
            .header("Authorization", self.auth_header_value())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn delete_file(&self, file_id: &str) -> Result<(), DriveError> {
        let url = self.file_endpoint(file_id)?;
        let response = self
            .http
            .delete(url)
            .header("Authorization", self.auth_header_value())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    fn auth_header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn endpoint(&self, path: &str) -> Result<Url, DriveError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn file_endpoint(&self, file_id: &str) -> Result<Url, DriveError> {
        let mut url = self.endpoint("/drive/v3/files")?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(file_id);
        Ok(url)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, DriveError> {
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn api_error(response: reqwest::Response) -> DriveError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        DriveError::Api { status, body }
    }
}

#[async_trait]
impl DriveTransport for DriveClient {
    async fn list_page(&self, request: &PageRequest) -> Result<FileList, DriveError> {
        self.list_files(request).await
    }

    async fn create_folder(&self, name: &str) -> Result<String, DriveError> {
        DriveClient::create_folder(self, name).await
    }

    async fn upload(&self, file: &NewFile) -> Result<String, DriveError> {
        self.upload_file(file).await
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, DriveError> {
        self.download_file(file_id).await
    }

    async fn delete(&self, file_id: &str) -> Result<(), DriveError> {
        self.delete_file(file_id).await
    }
}

/// A boundary whose delimiter line occurs in neither part.
fn multipart_boundary(metadata: &[u8], content: &[u8]) -> String {
    let occurs_in = |delimiter: &[u8], part: &[u8]| {
        part.windows(delimiter.len()).any(|window| window == delimiter)
    };
    (0u64..)
        .map(|n| format!("{BOUNDARY_PREFIX}_{n}"))
        .find(|boundary| {
            let delimiter = format!("--{boundary}");
            !occurs_in(delimiter.as_bytes(), metadata) && !occurs_in(delimiter.as_bytes(), content)
        })
        .unwrap_or_else(|| BOUNDARY_PREFIX.to_string())
}

fn multipart_related_body(boundary: &str, metadata: &[u8], file: &NewFile) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + file.content.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", file.mime_type).as_bytes());
    body.extend_from_slice(&file.content);
    body.extend_from_slice(format!("\r\n--{boundary}--").as_bytes());
    body
}

impl DriveError {
    pub fn classification(&self) -> Option<ApiErrorClass> {
        match self {
            DriveError::Api { status, .. } => Some(classify_api_status(*status)),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.classification(),
            Some(ApiErrorClass::RateLimit | ApiErrorClass::Transient)
        )
    }
}

fn classify_api_status(status: StatusCode) -> ApiErrorClass {
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        ApiErrorClass::Auth
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        ApiErrorClass::RateLimit
    } else if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
        ApiErrorClass::Transient
    } else {
        ApiErrorClass::Permanent
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub thumbnail_link: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
    #[serde(default)]
    pub trashed: bool,
    #[serde(default)]
    pub modified_time: Option<String>,
    #[serde(default, deserialize_with = "size_from_wire")]
    pub size: Option<u64>,
}

impl DriveFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeRepr {
    Number(u64),
    Text(String),
}

// int64 fields arrive as decimal strings.
fn size_from_wire<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<SizeRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(SizeRepr::Number(value)) => Ok(Some(value)),
        Some(SizeRepr::Text(text)) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
