//! Stateless HTTP request builder and response parser for the blog store.
//!
//! # Design
//! `BlogClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The one-shot helpers at the bottom glue the two halves around a
//! `Transport` for callers that do not need the query cache.

use percent_encoding::{utf8_percent_encode, AsciiSet, PercentEncode, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{NewPost, Post, PostId};

/// Address the reference store listens on.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Everything outside the RFC 3986 unreserved set is escaped, so an id is
/// always exactly one path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

fn segment(id: &PostId) -> PercentEncode<'_> {
    utf8_percent_encode(id.as_str(), PATH_SEGMENT)
}

/// Synchronous, stateless client for the `/blogs` collection.
#[derive(Debug, Clone)]
pub struct BlogClient {
    base_url: String,
}

impl Default for BlogClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl BlogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_posts(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/blogs", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_post(&self, id: &PostId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/blogs/{}", self.base_url, segment(id)),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_post(&self, input: &NewPost) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/blogs", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_delete_post(&self, id: &PostId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/blogs/{}", self.base_url, segment(id)),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        check_status(&response, &[200])?;
        decode(&response.body)
    }

    pub fn parse_get_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response, &[200])?;
        decode(&response.body)
    }

    /// json-server answers 201; some stores answer 200. Both carry the post.
    pub fn parse_create_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        check_status(&response, &[200, 201])?;
        decode(&response.body)
    }

    /// The body of a delete is ignored whatever the store sends back.
    pub fn parse_delete_post(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[200, 204])?;
        Ok(())
    }

    pub fn list_posts(&self, transport: &impl Transport) -> Result<Vec<Post>, ApiError> {
        let response = transport.execute(self.build_list_posts())?;
        self.parse_list_posts(response)
    }

    pub fn get_post(&self, transport: &impl Transport, id: &PostId) -> Result<Post, ApiError> {
        let response = transport.execute(self.build_get_post(id))?;
        self.parse_get_post(response)
    }

    pub fn create_post(
        &self,
        transport: &impl Transport,
        input: &NewPost,
    ) -> Result<Post, ApiError> {
        let response = transport.execute(self.build_create_post(input)?)?;
        self.parse_create_post(response)
    }

    pub fn delete_post(&self, transport: &impl Transport, id: &PostId) -> Result<(), ApiError> {
        let response = transport.execute(self.build_delete_post(id))?;
        self.parse_delete_post(response)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
