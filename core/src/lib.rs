//! Client core for a blog browser backed by a generic REST store.
//!
//! # Overview
//! Two layers, neither of which touches the network:
//! - the data access layer (`BlogClient`) builds `HttpRequest` values and
//!   parses `HttpResponse` values for the `/blogs` collection;
//! - the view/state layer (`BlogApp`) owns a keyed `QueryCache`, the current
//!   selection and the create/delete mutations, and hands the host the
//!   requests to run.
//!
//! # Design
//! - The host implements `Transport` and performs I/O, keeping the core
//!   deterministic and easy to test.
//! - Responses are validated into typed `Post` records at the boundary.
//! - Successful mutations invalidate the list query; results are applied by
//!   key and generation so a superseded fetch never wins.

pub mod app;
pub mod client;
pub mod error;
pub mod form;
pub mod http;
pub mod query;
pub mod types;

pub use app::{
    BlogApp, Command, Confirm, DetailPane, FormPane, ListPane, MutationState, QueryData,
    QueryKey, RequestId, DELETE_PROMPT,
};
pub use client::{BlogClient, DEFAULT_BASE_URL};
pub use error::{ApiError, FormError};
pub use form::{PostForm, COVER_IMAGE_PLACEHOLDER};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use query::{FetchTicket, QueryCache, QueryState, QueryStatus};
pub use types::{NewPost, Post, PostId};
