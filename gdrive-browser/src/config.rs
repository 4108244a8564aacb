use gdrive_core::DEFAULT_BASE_URL;

use crate::error::ConfigError;
use crate::filter::{FileCategory, MimeFilter};

pub const DEFAULT_PAGE_SIZE: u32 = 100;
const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriveConfig {
    pub api_base_url: String,
    pub page_size: u32,
    pub file_types: Vec<FileCategory>,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            file_types: Vec::new(),
        }
    }
}

impl DriveConfig {
    /// Reads `GDRIVE_API_BASE_URL`, `GDRIVE_PAGE_SIZE` and `GDRIVE_FILE_TYPES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("GDRIVE_API_BASE_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let page_size = match lookup("GDRIVE_PAGE_SIZE") {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "GDRIVE_PAGE_SIZE",
                    value,
                })?
                .min(MAX_PAGE_SIZE),
            None => DEFAULT_PAGE_SIZE,
        };
        let file_types = match lookup("GDRIVE_FILE_TYPES") {
            Some(value) => parse_categories(&value)?,
            None => Vec::new(),
        };
        Ok(Self {
            api_base_url,
            page_size,
            file_types,
        })
    }

    pub fn mime_filter(&self) -> MimeFilter {
        MimeFilter::from_categories(&self.file_types)
    }
}

fn parse_categories(value: &str) -> Result<Vec<FileCategory>, ConfigError> {
    value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = DriveConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DriveConfig::default());
        assert!(config.mime_filter().is_empty());
    }

    #[test]
    fn reads_overrides() {
        let config = DriveConfig::from_lookup(lookup(&[
            ("GDRIVE_API_BASE_URL", "http://127.0.0.1:9000"),
            ("GDRIVE_PAGE_SIZE", "5000"),
            ("GDRIVE_FILE_TYPES", "pdf, documents,"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.page_size, 1000);
        assert_eq!(
            config.file_types,
            [FileCategory::Pdf, FileCategory::Documents]
        );
        assert_eq!(config.mime_filter().iter().count(), 4);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            DriveConfig::from_lookup(lookup(&[("GDRIVE_PAGE_SIZE", "0")])),
            Err(ConfigError::InvalidValue { name: "GDRIVE_PAGE_SIZE", .. })
        ));
        assert!(matches!(
            DriveConfig::from_lookup(lookup(&[("GDRIVE_FILE_TYPES", "pdf,videos")])),
            Err(ConfigError::UnknownCategory(_))
        ));
    }
}
