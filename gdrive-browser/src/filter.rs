use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// File-type groups a picker can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Pdf,
    Images,
    Documents,
}

impl FileCategory {
    pub fn mime_types(self) -> &'static [&'static str] {
        match self {
            FileCategory::Pdf => &["application/pdf"],
            FileCategory::Images => &[
                "image/png",
                "image/jpeg",
                "application/vnd.google-apps.photo",
            ],
            FileCategory::Documents => &[
                "application/msword",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "application/vnd.google-apps.document",
            ],
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileCategory::Pdf => &[".pdf"],
            FileCategory::Images => &[".jpg", ".jpeg", ".png"],
            FileCategory::Documents => &[".doc", ".docx"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileCategory::Pdf => "pdf",
            FileCategory::Images => "images",
            FileCategory::Documents => "documents",
        }
    }
}

impl FromStr for FileCategory {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(FileCategory::Pdf),
            "images" => Ok(FileCategory::Images),
            "documents" => Ok(FileCategory::Documents),
            _ => Err(ConfigError::UnknownCategory(value.to_string())),
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allowed MIME types for a listing. Keeps insertion order, drops duplicates.
/// Empty means no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeFilter {
    mime_types: Vec<String>,
}

impl MimeFilter {
    pub fn new<I, S>(mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter = Self::default();
        for mime_type in mime_types {
            filter.push(mime_type);
        }
        filter
    }

    pub fn from_categories(categories: &[FileCategory]) -> Self {
        Self::new(
            categories
                .iter()
                .flat_map(|category| category.mime_types().iter().copied()),
        )
    }

    pub fn push(&mut self, mime_type: impl Into<String>) {
        let mime_type = mime_type.into();
        if !self.mime_types.contains(&mime_type) {
            self.mime_types.push(mime_type);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mime_types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.mime_types.iter().map(String::as_str)
    }
}
