// src/models/short_link.rs - Pure data structures
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validations::{validate_custom_alias, validate_url};

/// A code-to-URL mapping, the only persisted entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    /// Public identifier, either a custom alias or generated
    pub code: String,

    /// The original, long URL
    pub target: String,

    /// Number of successful resolutions
    pub hits: u64,

    pub created_at: DateTime<Utc>,
}

impl ShortLink {
    /// A fresh link with no hits, stamped now
    pub fn new(code: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            target: target.into(),
            hits: 0,
            created_at: Utc::now(),
        }
    }
}

// DTO for creating a new short link
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateShortLinkDto {
    #[serde(rename = "longURL", alias = "long_url")]
    #[validate(custom(function = "validate_url"))]
    pub long_url: String,

    #[serde(rename = "customAlias", alias = "custom", default)]
    #[validate(custom(function = "validate_custom_alias"))]
    pub custom_alias: Option<String>,
}

// DTO returned by the create endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortLinkCreatedDto {
    #[serde(rename = "shortURL")]
    pub short_url: String,
    pub code: String,
    #[serde(rename = "longURL")]
    pub long_url: String,
}

impl ShortLinkCreatedDto {
    pub fn new(base_domain: &str, link: ShortLink) -> Self {
        Self {
            short_url: format!("{}/{}", base_domain.trim_end_matches('/'), link.code),
            code: link.code,
            long_url: link.target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dto_accepts_both_field_spellings() {
        let dto: CreateShortLinkDto =
            serde_json::from_str(r#"{"longURL":"https://example.com","customAlias":"docs"}"#)
                .unwrap();
        assert_eq!(dto.long_url, "https://example.com");
        assert_eq!(dto.custom_alias.as_deref(), Some("docs"));

        let dto: CreateShortLinkDto =
            serde_json::from_str(r#"{"long_url":"https://example.com"}"#).unwrap();
        assert!(dto.custom_alias.is_none());
    }

    #[test]
    fn test_created_dto_builds_short_url() {
        let link = ShortLink::new("aB3xY9", "https://example.com");
        let dto = ShortLinkCreatedDto::new("http://sho.rt/", link);
        assert_eq!(dto.short_url, "http://sho.rt/aB3xY9");
        assert_eq!(dto.code, "aB3xY9");
        assert_eq!(dto.long_url, "https://example.com");
    }

    #[test]
    fn test_short_link_serializes_camel_case() {
        let link = ShortLink::new("abc123", "https://example.com");
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["code"], "abc123");
        assert_eq!(value["target"], "https://example.com");
        assert_eq!(value["hits"], 0);
        assert!(value.get("createdAt").is_some());
    }
}
