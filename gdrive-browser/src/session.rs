use std::sync::Arc;

use gdrive_core::{DriveClient, DriveTransport};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::DriveConfig;
use crate::error::BrowseError;

/// The authorized context every browsing operation runs against.
///
/// A session is created once sign-in has produced a transport and is
/// invalidated on sign-out. Clones share the same lifecycle.
#[derive(Clone)]
pub struct DriveSession {
    transport: Arc<dyn DriveTransport>,
    cancel: CancellationToken,
    page_size: u32,
}

impl DriveSession {
    pub fn new(transport: Arc<dyn DriveTransport>) -> Self {
        Self {
            transport,
            cancel: CancellationToken::new(),
            page_size: crate::config::DEFAULT_PAGE_SIZE,
        }
    }

    /// Builds an HTTP-backed session for an access token.
    pub fn from_token(token: impl Into<String>, config: &DriveConfig) -> Result<Self, BrowseError> {
        let client = DriveClient::with_base_url(&config.api_base_url, token)?;
        info!(base_url = %config.api_base_url, "drive session opened");
        Ok(Self::new(Arc::new(client)).with_page_size(config.page_size))
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn transport(&self) -> Result<&dyn DriveTransport, BrowseError> {
        self.ensure_active()?;
        Ok(self.transport.as_ref())
    }

    pub fn ensure_active(&self) -> Result<(), BrowseError> {
        if self.cancel.is_cancelled() {
            Err(BrowseError::SessionClosed)
        } else {
            Ok(())
        }
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Token cancelled when this session is invalidated. Requests that can be
    /// superseded hang their own child tokens off it.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn invalidate(&self) {
        if !self.cancel.is_cancelled() {
            info!("drive session invalidated");
        }
        self.cancel.cancel();
    }
}
