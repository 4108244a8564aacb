//! Browsing, search and upload workflows for a Google Drive file picker.
//!
//! Every operation takes a [`DriveSession`]; nothing here keeps global
//! state. [`Browser`] is the entry point for interactive navigation.

pub mod config;
pub mod entry;
pub mod error;
pub mod files;
pub mod filter;
pub mod listing;
pub mod navigator;
pub mod query;
pub mod session;
pub mod upload;

#[cfg(test)]
mod testing;

pub use config::DriveConfig;
pub use entry::{DegradedEntry, DriveEntry, EntryKind, RemoteEntry};
pub use error::{BrowseError, ConfigError};
pub use files::{delete, download, download_entry_to};
pub use filter::{FileCategory, MimeFilter};
pub use listing::{
    find_folder, list, list_folder, list_folder_named, list_my_drive, list_shared,
};
pub use navigator::{
    Browser, BrowserEvent, ListingTicket, ListingView, Location, Navigator, Root, Transition,
};
pub use query::Query;
pub use session::DriveSession;
pub use upload::{UploadRequest, upload_to_folder};
