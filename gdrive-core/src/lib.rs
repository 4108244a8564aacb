mod client;
mod transport;

pub use client::{
    ApiErrorClass, DEFAULT_BASE_URL, DriveClient, DriveError, DriveFile, FOLDER_MIME_TYPE,
    FileList,
};
pub use transport::{DriveTransport, NewFile, PageRequest};

pub use reqwest::StatusCode;
