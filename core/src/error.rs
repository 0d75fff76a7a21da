//! Error types for the blog store client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because the detail pane treats "the
//! post is gone" differently from "the store misbehaved." All other non-2xx
//! responses land in `HttpError` with the raw status code and body.
//! `TransportError` is produced by hosts when the round-trip itself fails.

use thiserror::Error;

/// Errors returned by `BlogClient` parse methods and by `Transport` hosts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The store returned 404; the requested post does not exist.
    #[error("resource not found")]
    NotFound,

    /// The store returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response (connection refused, reset, ...).
    #[error("transport failed: {0}")]
    TransportError(String),
}

/// Errors raised while turning the creation form into a payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    /// One or more required fields are empty.
    #[error("required fields missing: {}", .0.join(", "))]
    Invalid(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_includes_status_and_body() {
        let err = ApiError::HttpError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }

    #[test]
    fn form_error_lists_fields() {
        let err = FormError::Invalid(vec!["title".to_string(), "content".to_string()]);
        assert_eq!(err.to_string(), "required fields missing: title, content");
    }
}
