//! In-memory transport used by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gdrive_core::{
    DriveError, DriveFile, DriveTransport, FileList, NewFile, PageRequest, StatusCode,
};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    List {
        query: String,
        page_token: Option<String>,
    },
    CreateFolder(String),
    Upload(NewFile),
    Download(String),
    Delete(String),
}

#[derive(Debug, Clone)]
pub(crate) enum PageScript {
    Files(Vec<DriveFile>),
    Fail(u16),
    /// The listing call panics instead of answering.
    Panic,
}

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    listings: Mutex<HashMap<String, Vec<PageScript>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    contents: Mutex<HashMap<String, Vec<u8>>>,
    create_failure: Mutex<Option<u16>>,
    upload_failure: Mutex<Option<u16>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub(crate) fn with_listing(self, query: impl Into<String>, pages: Vec<PageScript>) -> Self {
        self.listings
            .lock()
            .unwrap()
            .insert(query.into(), pages);
        self
    }

    pub(crate) fn with_content(self, file_id: &str, content: &[u8]) -> Self {
        self.contents
            .lock()
            .unwrap()
            .insert(file_id.to_string(), content.to_vec());
        self
    }

    pub(crate) fn failing_create(self, status: u16) -> Self {
        *self.create_failure.lock().unwrap() = Some(status);
        self
    }

    pub(crate) fn failing_upload(self, status: u16) -> Self {
        *self.upload_failure.lock().unwrap() = Some(status);
        self
    }

    /// Listing calls for `query` block until the returned handle is notified.
    pub(crate) fn hold(&self, query: impl Into<String>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(query.into(), gate.clone());
        gate
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn api_error(code: u16) -> DriveError {
    DriveError::Api {
        status: StatusCode::from_u16(code).unwrap(),
        body: format!("scripted failure {code}"),
    }
}

#[async_trait]
impl DriveTransport for ScriptedTransport {
    async fn list_page(&self, request: &PageRequest) -> Result<FileList, DriveError> {
        self.record(Call::List {
            query: request.query.clone(),
            page_token: request.page_token.clone(),
        });
        let gate = self.gates.lock().unwrap().get(&request.query).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let pages = self
            .listings
            .lock()
            .unwrap()
            .get(&request.query)
            .cloned()
            .unwrap_or_default();
        let index = request
            .page_token
            .as_deref()
            .and_then(|token| token.strip_prefix("page-"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        match pages.get(index) {
            None => Ok(FileList::default()),
            Some(PageScript::Fail(code)) => Err(api_error(*code)),
            Some(PageScript::Panic) => panic!("scripted listing panic for {}", request.query),
            Some(PageScript::Files(files)) => Ok(FileList {
                files: files.clone(),
                next_page_token: (index + 1 < pages.len()).then(|| format!("page-{}", index + 1)),
            }),
        }
    }

    async fn create_folder(&self, name: &str) -> Result<String, DriveError> {
        self.record(Call::CreateFolder(name.to_string()));
        match *self.create_failure.lock().unwrap() {
            Some(code) => Err(api_error(code)),
            None => Ok(format!("created-{name}")),
        }
    }

    async fn upload(&self, file: &NewFile) -> Result<String, DriveError> {
        self.record(Call::Upload(file.clone()));
        match *self.upload_failure.lock().unwrap() {
            Some(code) => Err(api_error(code)),
            None => Ok(format!("uploaded-{}", file.name)),
        }
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, DriveError> {
        self.record(Call::Download(file_id.to_string()));
        self.contents
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| api_error(404))
    }

    async fn delete(&self, file_id: &str) -> Result<(), DriveError> {
        self.record(Call::Delete(file_id.to_string()));
        if self.contents.lock().unwrap().remove(file_id).is_some() {
            Ok(())
        } else {
            Err(api_error(404))
        }
    }
}
