//! Core record types for hivearchive.
//!
//! A record is an immutable text snippet kept in the remote store under a
//! generated identifier, together with the client time it was submitted.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Format used when showing a record's creation time.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A stored text snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier assigned at write time.
    pub id: String,

    /// The snippet text. Never empty for records accepted by the write path.
    pub text: String,

    /// Submission time in milliseconds since the Unix epoch.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl Record {
    /// Build a record from its identifier and stored document.
    #[must_use]
    pub fn from_document(id: impl Into<String>, document: Document) -> Self {
        Self {
            id: id.into(),
            text: document.text,
            created_at: document.created_at,
        }
    }

    /// The document body persisted for this record.
    #[must_use]
    pub fn document(&self) -> Document {
        Document {
            text: self.text.clone(),
            created_at: self.created_at,
        }
    }

    /// Creation time as a UTC timestamp, if representable.
    #[must_use]
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.created_at).single()
    }

    /// Creation time rendered in the local time zone.
    #[must_use]
    pub fn created_at_display(&self) -> String {
        self.created_at_utc().map_or_else(
            || self.created_at.to_string(),
            |dt| dt.with_timezone(&Local).format(DISPLAY_TIME_FORMAT).to_string(),
        )
    }

    /// Case-insensitive substring match against the text.
    ///
    /// `needle_lower` must already be lowercased.
    #[must_use]
    pub fn matches(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.text.to_lowercase().contains(needle_lower)
    }
}

/// Wire form of a record: the body stored under `<path>/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// The snippet text.
    pub text: String,

    /// Submission time in milliseconds since the Unix epoch.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

/// A document as it may appear in the store, before validation.
///
/// Other writers can leave entries without text or timestamps; those are
/// skipped on fetch.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawDocument {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<serde_json::Number>,
}

impl RawDocument {
    /// Validate into a [`Document`], returning why it was rejected otherwise.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn into_document(self) -> std::result::Result<Document, &'static str> {
        let text = match self.text {
            Some(text) if !text.is_empty() => text,
            Some(_) => return Err("empty text"),
            None => return Err("missing text"),
        };
        let created_at = self
            .created_at
            .as_ref()
            .and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)))
            .ok_or("missing createdAt")?;
        Ok(Document { text, created_at })
    }
}

/// Current client time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
