use gdrive_core::PageRequest;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::entry::{DriveEntry, RemoteEntry, sort_entries};
use crate::error::BrowseError;
use crate::filter::MimeFilter;
use crate::query::{self, Query};
use crate::session::DriveSession;

/// Projection requested on every listing call.
pub const FILE_FIELDS: &str =
    "nextPageToken,files(id,name,mimeType,thumbnailLink,webViewLink,trashed,modifiedTime,size)";

/// Runs `query` to exhaustion and returns every entry, sorted.
///
/// Pages are fetched one after another. The first failing page fails the
/// whole call; partial results are never returned.
pub async fn list(session: &DriveSession, query: &Query) -> Result<Vec<RemoteEntry>, BrowseError> {
    list_until_cancelled(session, query, session.cancellation()).await
}

/// Like [`list`], but also stops once `cancel` fires.
pub async fn list_until_cancelled(
    session: &DriveSession,
    query: &Query,
    cancel: &CancellationToken,
) -> Result<Vec<RemoteEntry>, BrowseError> {
    let transport = session.transport()?;
    let mut request = PageRequest {
        query: query.compose(),
        fields: FILE_FIELDS.to_string(),
        page_size: session.page_size(),
        page_token: None,
    };
    let mut files = Vec::new();
    let mut pages = 0u32;
    loop {
        let page = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(session)),
            page = transport.list_page(&request) => page?,
        };
        pages += 1;
        debug!(
            query = %request.query,
            page = pages,
            items = page.files.len(),
            more = page.next_page_token.is_some(),
            "fetched listing page"
        );
        files.extend(page.files);
        match page.next_page_token {
            Some(token) => request.page_token = Some(token),
            None => break,
        }
    }
    let mut entries: Vec<RemoteEntry> = files.into_iter().map(RemoteEntry::from_file).collect();
    sort_entries(&mut entries);
    Ok(entries)
}

fn cancelled(session: &DriveSession) -> BrowseError {
    if session.is_active() {
        BrowseError::Cancelled
    } else {
        BrowseError::SessionClosed
    }
}

pub fn my_drive_query(filter: &MimeFilter) -> Query {
    Query::new()
        .with_condition(query::OWNED_BY_ME)
        .with_condition(query::IN_ROOT)
        .with_filter(filter.clone())
}

pub fn shared_query(filter: &MimeFilter) -> Query {
    Query::new()
        .with_condition(query::SHARED_WITH_ME)
        .with_filter(filter.clone())
}

pub fn folder_query(folder_id: &str) -> Query {
    Query::new().with_condition(query::in_parents(folder_id))
}

pub fn find_folder_query(name: &str) -> Query {
    Query::new()
        .with_condition(query::name_contains(name))
        .with_condition(query::IS_FOLDER)
}

pub async fn list_my_drive(
    session: &DriveSession,
    filter: &MimeFilter,
) -> Result<Vec<RemoteEntry>, BrowseError> {
    list(session, &my_drive_query(filter)).await
}

pub async fn list_shared(
    session: &DriveSession,
    filter: &MimeFilter,
) -> Result<Vec<RemoteEntry>, BrowseError> {
    list(session, &shared_query(filter)).await
}

pub async fn list_folder(
    session: &DriveSession,
    folder_id: &str,
) -> Result<Vec<RemoteEntry>, BrowseError> {
    list(session, &folder_query(folder_id)).await
}

/// The folder an upload or lookup by `name` should use.
///
/// A folder named exactly `name` wins over one that merely contains it;
/// among equals the listing order decides. Trashed folders and entries
/// without an identifier are never chosen.
pub async fn find_folder(
    session: &DriveSession,
    name: &str,
) -> Result<Option<DriveEntry>, BrowseError> {
    let entries = list(session, &find_folder_query(name)).await?;
    let candidates = entries.into_iter().filter_map(|entry| match entry {
        RemoteEntry::Actionable(entry) if entry.is_folder() && !entry.trashed => Some(entry),
        _ => None,
    });
    let mut first_partial = None;
    for candidate in candidates {
        if candidate.name.as_deref() == Some(name) {
            return Ok(Some(candidate));
        }
        if first_partial.is_none() {
            first_partial = Some(candidate);
        }
    }
    Ok(first_partial)
}

/// Lists the contents of the folder [`find_folder`] picks for `name`.
/// `None` when no folder matches.
pub async fn list_folder_named(
    session: &DriveSession,
    name: &str,
) -> Result<Option<Vec<RemoteEntry>>, BrowseError> {
    let Some(folder) = find_folder(session, name).await? else {
        debug!(%name, "no folder matches name");
        return Ok(None);
    };
    list_folder(session, &folder.id).await.map(Some)
}
