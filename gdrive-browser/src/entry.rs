use std::cmp::Ordering;

use gdrive_core::DriveFile;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::warn;

use crate::error::BrowseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Folder,
    File,
}

/// An entry with an identifier: it can be opened, downloaded and deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveEntry {
    pub id: String,
    pub name: Option<String>,
    pub kind: EntryKind,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub modified: Option<OffsetDateTime>,
    pub thumbnail_link: Option<String>,
    pub web_view_link: Option<String>,
    pub trashed: bool,
}

impl DriveEntry {
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }
}

/// An entry the service returned without an identifier. It is shown, never
/// acted on.
#[derive(Debug, Clone, PartialEq)]
pub struct DegradedEntry {
    pub name: Option<String>,
    pub kind: EntryKind,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteEntry {
    Actionable(DriveEntry),
    Degraded(DegradedEntry),
}

impl RemoteEntry {
    pub fn from_file(file: DriveFile) -> Self {
        let kind = if file.is_folder() {
            EntryKind::Folder
        } else {
            EntryKind::File
        };
        let Some(id) = file.id else {
            warn!(name = ?file.name, "drive entry without identifier");
            return RemoteEntry::Degraded(DegradedEntry {
                name: file.name,
                kind,
                mime_type: file.mime_type,
            });
        };
        let modified = file
            .modified_time
            .as_deref()
            .and_then(|value| OffsetDateTime::parse(value, &Rfc3339).ok());
        RemoteEntry::Actionable(DriveEntry {
            id,
            name: file.name,
            kind,
            mime_type: file.mime_type,
            size: if kind == EntryKind::Folder {
                None
            } else {
                file.size
            },
            modified,
            thumbnail_link: file.thumbnail_link,
            web_view_link: file.web_view_link,
            trashed: file.trashed,
        })
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            RemoteEntry::Actionable(entry) => Some(&entry.id),
            RemoteEntry::Degraded(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            RemoteEntry::Actionable(entry) => entry.name.as_deref(),
            RemoteEntry::Degraded(entry) => entry.name.as_deref(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            RemoteEntry::Actionable(entry) => entry.kind,
            RemoteEntry::Degraded(entry) => entry.kind,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind() == EntryKind::Folder
    }

    /// The actionable view of this entry, or [`BrowseError::DeadEnd`].
    pub fn actionable(&self) -> Result<&DriveEntry, BrowseError> {
        match self {
            RemoteEntry::Actionable(entry) => Ok(entry),
            RemoteEntry::Degraded(entry) => Err(BrowseError::DeadEnd {
                name: entry.name.clone(),
            }),
        }
    }
}

/// Folders first, then case-sensitive name order. Unnamed entries follow
/// named ones in their group; remaining ties fall back to the identifier.
pub fn compare_entries(a: &RemoteEntry, b: &RemoteEntry) -> Ordering {
    kind_rank(a.kind())
        .cmp(&kind_rank(b.kind()))
        .then_with(|| present_first(a.name(), b.name()))
        .then_with(|| present_first(a.id(), b.id()))
}

/// Stable, so entries that compare equal keep their arrival order.
pub fn sort_entries(entries: &mut [RemoteEntry]) {
    entries.sort_by(compare_entries);
}

fn kind_rank(kind: EntryKind) -> u8 {
    match kind {
        EntryKind::Folder => 0,
        EntryKind::File => 1,
    }
}

fn present_first(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
pub(crate) fn file(id: Option<&str>, name: Option<&str>, mime_type: &str) -> DriveFile {
    DriveFile {
        id: id.map(str::to_string),
        name: name.map(str::to_string),
        mime_type: Some(mime_type.to_string()),
        ..DriveFile::default()
    }
}
