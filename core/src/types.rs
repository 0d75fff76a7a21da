//! Domain DTOs for the blog store.
//!
//! # Design
//! These types mirror the store's JSON schema but are defined independently
//! of the mock-server crate; integration tests catch any schema drift.
//! Required fields are enforced by serde at the boundary, so a malformed
//! record surfaces as `ApiError::DeserializationError` instead of flowing
//! into the view half-populated.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Opaque post identifier assigned by the store.
///
/// Generic REST mock stores hand out either strings or integers, so both
/// are accepted on input. The id is always written back out as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "RawId")]
pub struct PostId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for PostId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => PostId(s),
            RawId::Number(n) => PostId(n.to_string()),
        }
    }
}

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        PostId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for PostId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        PostId(s.to_string())
    }
}

impl From<String> for PostId {
    fn from(s: String) -> Self {
        PostId(s)
    }
}

/// A single blog post returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
    pub date: String,
    pub cover_image: String,
}

/// Request payload for creating a post. The store assigns the id.
///
/// `description` is written as `null` when absent rather than skipped; the
/// creation form never collects it but the payload always carries the key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub category: Vec<String>,
    pub description: Option<String>,
    pub content: String,
    pub date: String,
    pub cover_image: String,
}
