//! Document descriptor
//!
//! Listing metadata for one document, built from its header.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::metadata::FrontMatter;

/// Publication status of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Published,
}

impl Default for DocumentStatus {
    fn default() -> Self {
        Self::Published
    }
}

impl DocumentStatus {
    /// Anything other than `published` keeps a document out of listings
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("published") {
            Self::Published
        } else {
            Self::Draft
        }
    }
}

/// Metadata record for one listable document, without its body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDescriptor {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "publishedAt", default)]
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(rename = "image", default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub status: DocumentStatus,
}

impl DocumentDescriptor {
    /// Build a descriptor from a document id and its header
    pub fn from_front_matter(id: &str, front_matter: &FrontMatter) -> Self {
        let text = |key: &str| front_matter.get(key).and_then(scalar_text);

        Self {
            id: id.to_string(),
            title: text("title").unwrap_or_else(|| id.to_string()),
            subtitle: text("subtitle"),
            description: text("description"),
            published_date: text("publishedAt")
                .or_else(|| text("date"))
                .and_then(|d| parse_date(&d)),
            tags: front_matter.get("tags").map(string_list).unwrap_or_default(),
            featured: matches!(front_matter.get("featured"), Some(Value::Bool(true))),
            cover_image: text("image"),
            status: text("status")
                .map(|s| DocumentStatus::parse(&s))
                .unwrap_or_default(),
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == DocumentStatus::Published
    }
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::split_header;

    fn descriptor(source: &str) -> DocumentDescriptor {
        let (fm, _) = split_header(source).unwrap();
        DocumentDescriptor::from_front_matter("ml-insights", &fm)
    }

    #[test]
    fn test_full_header() {
        let d = descriptor(
            "---\ntitle: Machine Learning Insights\nsubtitle: Deep Learning & AI\ndescription: Trends\npublishedAt: 2024-12-01\ntags: [Machine Learning, AI]\nfeatured: true\nimage: /covers/ml.png\nstatus: published\n---\n",
        );

        assert_eq!(d.title, "Machine Learning Insights");
        assert_eq!(d.subtitle.as_deref(), Some("Deep Learning & AI"));
        assert_eq!(d.published_date, NaiveDate::from_ymd_opt(2024, 12, 1));
        assert_eq!(d.tags, vec!["Machine Learning", "AI"]);
        assert!(d.featured);
        assert_eq!(d.cover_image.as_deref(), Some("/covers/ml.png"));
        assert!(d.is_published());
    }

    #[test]
    fn test_defaults() {
        let d = descriptor("---\n---\n");

        assert_eq!(d.title, "ml-insights");
        assert_eq!(d.published_date, None);
        assert!(d.tags.is_empty());
        assert!(!d.featured);
        assert_eq!(d.status, DocumentStatus::Published);
    }

    #[test]
    fn test_unknown_status_is_draft() {
        assert_eq!(DocumentStatus::parse("review"), DocumentStatus::Draft);
        assert_eq!(DocumentStatus::parse("Published"), DocumentStatus::Published);
        assert!(!descriptor("---\nstatus: draft\n---\n").is_published());
    }

    #[test]
    fn test_rfc3339_date_and_single_tag() {
        let d = descriptor("---\npublishedAt: 2024-11-15T08:30:00Z\ntags: Backend\n---\n");
        assert_eq!(d.published_date, NaiveDate::from_ymd_opt(2024, 11, 15));
        assert_eq!(d.tags, vec!["Backend"]);
    }

    #[test]
    fn test_wire_field_names() {
        let d = descriptor("---\npublishedAt: 2024-12-01\nimage: /a.png\n---\n");
        let json = serde_json::to_value(&d).unwrap();

        assert_eq!(json["publishedAt"], "2024-12-01");
        assert_eq!(json["image"], "/a.png");
        assert_eq!(json["status"], "published");
        assert!(json.get("subtitle").is_none());
    }
}
