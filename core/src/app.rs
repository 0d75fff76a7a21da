//! View/state controller for the blog browser.
//!
//! # Design
//! `BlogApp` owns all client-side state: the query cache, the selected post,
//! form visibility and the two mutation states. It never performs I/O. Each
//! user action returns the `Command`s the host must execute, and the host
//! feeds every outcome back through `handle_response`, which may in turn
//! yield follow-up commands (a list re-fetch after a successful mutation).
//!
//! Mutations are not optimistic: the cache changes only after the store
//! confirms. Views read the cache strictly by key, so the detail pane only
//! ever shows the entry for the current selection.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::client::BlogClient;
use crate::error::{ApiError, FormError};
use crate::form::PostForm;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::query::{FetchTicket, QueryCache, QueryStatus};
use crate::types::{Post, PostId};

/// Prompt shown before a post is deleted.
pub const DELETE_PROMPT: &str = "Delete this post forever?";

/// Logical query names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Posts,
    Post(PostId),
}

/// Values stored in the cache, one variant per `QueryKey` kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryData {
    Posts(Vec<Post>),
    Post(Post),
}

/// Handle pairing a `Command` with its eventual response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A request the host must execute, then report via `handle_response`.
#[derive(Debug, Clone)]
pub struct Command {
    pub id: RequestId,
    pub request: HttpRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Failed(String),
}

impl MutationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, MutationState::Pending)
    }
}

/// Blocking yes/no prompt.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListPane<'a> {
    Loading,
    Ready {
        posts: &'a [Post],
        selected: Option<&'a PostId>,
        refreshing: bool,
    },
    Failed {
        message: &'a str,
        posts: &'a [Post],
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailPane<'a> {
    Empty,
    Loading,
    Ready { post: &'a Post, deleting: bool },
    Failed(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPane<'a> {
    pub publishing: bool,
    pub error: Option<&'a str>,
}

#[derive(Debug)]
enum Pending {
    Query(FetchTicket<QueryKey>),
    Create,
    Delete(PostId),
}

#[derive(Debug)]
pub struct BlogApp {
    client: BlogClient,
    cache: QueryCache<QueryKey, QueryData>,
    selected: Option<PostId>,
    form_open: bool,
    create: MutationState,
    delete: MutationState,
    next_request: u64,
    in_flight: HashMap<RequestId, Pending>,
}

impl BlogApp {
    pub fn new(client: BlogClient) -> Self {
        Self {
            client,
            cache: QueryCache::new(),
            selected: None,
            form_open: false,
            create: MutationState::Idle,
            delete: MutationState::Idle,
            next_request: 0,
            in_flight: HashMap::new(),
        }
    }

    /// Load the post list unless it is already cached and fresh.
    pub fn mount(&mut self) -> Vec<Command> {
        if self.cache.needs_fetch(&QueryKey::Posts) {
            vec![self.fetch(QueryKey::Posts)]
        } else {
            Vec::new()
        }
    }

    pub fn select(&mut self, id: PostId) -> Vec<Command> {
        debug!(%id, "post selected");
        let key = QueryKey::Post(id.clone());
        self.selected = Some(id);
        if self.cache.needs_fetch(&key) {
            vec![self.fetch(key)]
        } else {
            Vec::new()
        }
    }

    pub fn open_form(&mut self) {
        self.form_open = true;
    }

    pub fn close_form(&mut self) {
        self.form_open = false;
    }

    /// Validate and submit the creation form.
    ///
    /// Validation failures return `Err` without issuing a request. A second
    /// submit while one is pending is ignored.
    pub fn submit_form(
        &mut self,
        form: PostForm,
        now: DateTime<Utc>,
    ) -> Result<Vec<Command>, FormError> {
        if self.create.is_pending() {
            debug!("create already pending, submit ignored");
            return Ok(Vec::new());
        }
        let payload = form.into_new_post(now)?;
        match self.client.build_create_post(&payload) {
            Ok(request) => {
                self.create = MutationState::Pending;
                Ok(vec![self.issue(Pending::Create, request)])
            }
            Err(e) => {
                warn!(error = %e, "create payload could not be encoded");
                self.create = MutationState::Failed(e.to_string());
                Ok(Vec::new())
            }
        }
    }

    /// Ask for confirmation, then delete `id`. Declining issues nothing.
    pub fn delete(&mut self, id: PostId, confirm: &mut impl Confirm) -> Vec<Command> {
        if self.delete.is_pending() {
            debug!("delete already pending, request ignored");
            return Vec::new();
        }
        if !confirm.confirm(DELETE_PROMPT) {
            debug!(%id, "delete declined");
            return Vec::new();
        }
        let request = self.client.build_delete_post(&id);
        self.delete = MutationState::Pending;
        vec![self.issue(Pending::Delete(id), request)]
    }

    /// Force the list to re-fetch.
    pub fn refresh(&mut self) -> Vec<Command> {
        self.invalidate_posts()
    }

    /// Feed back the outcome of a command previously handed to the host.
    pub fn handle_response(
        &mut self,
        id: RequestId,
        result: Result<HttpResponse, ApiError>,
    ) -> Vec<Command> {
        let Some(pending) = self.in_flight.remove(&id) else {
            debug!(%id, "response for unknown request ignored");
            return Vec::new();
        };

        match pending {
            Pending::Query(ticket) => {
                let data = match ticket.key() {
                    QueryKey::Posts => result
                        .and_then(|r| self.client.parse_list_posts(r))
                        .map(QueryData::Posts),
                    QueryKey::Post(_) => result
                        .and_then(|r| self.client.parse_get_post(r))
                        .map(QueryData::Post),
                };
                self.cache.resolve(ticket, data.map_err(|e| e.to_string()));
                Vec::new()
            }
            Pending::Create => match result.and_then(|r| self.client.parse_create_post(r)) {
                Ok(post) => {
                    info!(id = %post.id, title = %post.title, "post created");
                    self.create = MutationState::Idle;
                    self.form_open = false;
                    self.invalidate_posts()
                }
                Err(e) => {
                    warn!(error = %e, "create failed");
                    self.create = MutationState::Failed(e.to_string());
                    Vec::new()
                }
            },
            Pending::Delete(post_id) => {
                match result.and_then(|r| self.client.parse_delete_post(r)) {
                    Ok(()) => {
                        info!(id = %post_id, "post deleted");
                        self.delete = MutationState::Idle;
                        self.cache.remove(&QueryKey::Post(post_id.clone()));
                        if self.selected.as_ref() == Some(&post_id) {
                            self.selected = None;
                        }
                        self.invalidate_posts()
                    }
                    Err(e) => {
                        warn!(id = %post_id, error = %e, "delete failed");
                        self.delete = MutationState::Failed(e.to_string());
                        Vec::new()
                    }
                }
            }
        }
    }

    /// Execute `commands` and every follow-up they produce, in order.
    pub fn drive(&mut self, transport: &impl Transport, commands: Vec<Command>) {
        let mut queue: VecDeque<Command> = commands.into();
        while let Some(command) = queue.pop_front() {
            debug!(
                id = %command.id,
                method = command.request.method.as_str(),
                path = %command.request.path,
                "executing request"
            );
            let result = transport.execute(command.request);
            queue.extend(self.handle_response(command.id, result));
        }
    }

    pub fn list_pane(&self) -> ListPane<'_> {
        let Some(state) = self.cache.get(&QueryKey::Posts) else {
            return ListPane::Loading;
        };
        let posts = match &state.data {
            Some(QueryData::Posts(posts)) => posts.as_slice(),
            _ => &[],
        };
        match state.status {
            QueryStatus::Loading => ListPane::Loading,
            QueryStatus::Errored => ListPane::Failed {
                message: state.error.as_deref().unwrap_or("unknown error"),
                posts,
            },
            QueryStatus::Resolved | QueryStatus::Invalidated => ListPane::Ready {
                posts,
                selected: self.selected.as_ref(),
                refreshing: state.fetching,
            },
        }
    }

    pub fn detail_pane(&self) -> DetailPane<'_> {
        let Some(id) = &self.selected else {
            return DetailPane::Empty;
        };
        let Some(state) = self.cache.get(&QueryKey::Post(id.clone())) else {
            return DetailPane::Loading;
        };
        match (&state.status, &state.data) {
            (QueryStatus::Errored, _) => {
                DetailPane::Failed(state.error.as_deref().unwrap_or("unknown error"))
            }
            (_, Some(QueryData::Post(post))) => DetailPane::Ready {
                post,
                deleting: self.delete.is_pending(),
            },
            _ => DetailPane::Loading,
        }
    }

    pub fn form_pane(&self) -> Option<FormPane<'_>> {
        if !self.form_open {
            return None;
        }
        let error = match &self.create {
            MutationState::Failed(message) => Some(message.as_str()),
            _ => None,
        };
        Some(FormPane {
            publishing: self.create.is_pending(),
            error,
        })
    }

    pub fn selected(&self) -> Option<&PostId> {
        self.selected.as_ref()
    }

    pub fn create_state(&self) -> &MutationState {
        &self.create
    }

    pub fn delete_state(&self) -> &MutationState {
        &self.delete
    }

    pub fn cache(&self) -> &QueryCache<QueryKey, QueryData> {
        &self.cache
    }

    /// True once every issued command has been answered.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    fn invalidate_posts(&mut self) -> Vec<Command> {
        self.cache.invalidate(&QueryKey::Posts);
        vec![self.fetch(QueryKey::Posts)]
    }

    fn fetch(&mut self, key: QueryKey) -> Command {
        let request = match &key {
            QueryKey::Posts => self.client.build_list_posts(),
            QueryKey::Post(id) => self.client.build_get_post(id),
        };
        let ticket = self.cache.begin_fetch(key);
        self.issue(Pending::Query(ticket), request)
    }

    fn issue(&mut self, pending: Pending, request: HttpRequest) -> Command {
        self.next_request += 1;
        let id = RequestId(self.next_request);
        self.in_flight.insert(id, pending);
        Command { id, request }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::http::HttpMethod;

    fn app() -> BlogApp {
        BlogApp::new(BlogClient::new("http://store"))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
    }

    fn post_json(id: &str, title: &str) -> String {
        format!(
            r#"{{"id":"{id}","title":"{title}","category":["TECH"],"description":null,"content":"body of {title}","date":"2026-01-01T00:00:00.000Z","coverImage":"https://x/y.jpg"}}"#
        )
    }

    fn ok(status: u16, body: &str) -> Result<HttpResponse, ApiError> {
        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        })
    }

    fn titles(app: &BlogApp) -> Vec<String> {
        match app.list_pane() {
            ListPane::Ready { posts, .. } | ListPane::Failed { posts, .. } => {
                posts.iter().map(|p| p.title.clone()).collect()
            }
            ListPane::Loading => Vec::new(),
        }
    }

    fn single(mut commands: Vec<Command>) -> Command {
        assert_eq!(commands.len(), 1, "expected exactly one command");
        commands.remove(0)
    }

    fn loaded(list: &[(&str, &str)]) -> BlogApp {
        let mut app = app();
        let cmd = single(app.mount());
        let body = format!(
            "[{}]",
            list.iter()
                .map(|(id, title)| post_json(id, title))
                .collect::<Vec<_>>()
                .join(",")
        );
        app.handle_response(cmd.id, ok(200, &body));
        app
    }

    #[test]
    fn mount_fetches_list_and_shows_loading() {
        let mut app = app();
        let cmd = single(app.mount());
        assert_eq!(cmd.request.method, HttpMethod::Get);
        assert_eq!(cmd.request.path, "http://store/blogs");
        assert_eq!(app.list_pane(), ListPane::Loading);
        assert_eq!(app.detail_pane(), DetailPane::Empty);
    }

    #[test]
    fn list_resolves_into_ready_pane() {
        let app = loaded(&[("1", "First"), ("2", "Second")]);
        assert_eq!(titles(&app), vec!["First", "Second"]);
        assert!(matches!(app.list_pane(), ListPane::Ready { refreshing: false, .. }));
        assert!(app.is_idle());
    }

    #[test]
    fn selecting_fetches_detail_once() {
        let mut app = loaded(&[("1", "First")]);
        let cmd = single(app.select(PostId::new("1")));
        assert_eq!(cmd.request.path, "http://store/blogs/1");
        assert_eq!(app.detail_pane(), DetailPane::Loading);
        app.handle_response(cmd.id, ok(200, &post_json("1", "First")));
        assert!(matches!(app.detail_pane(), DetailPane::Ready { post, .. } if post.title == "First"));

        // cached and fresh: no second request
        assert!(app.select(PostId::new("1")).is_empty());
    }

    #[test]
    fn late_detail_for_previous_selection_never_shows() {
        let mut app = loaded(&[("a", "A"), ("b", "B")]);
        let for_a = single(app.select(PostId::new("a")));
        let for_b = single(app.select(PostId::new("b")));

        app.handle_response(for_b.id, ok(200, &post_json("b", "B")));
        app.handle_response(for_a.id, ok(200, &post_json("a", "A")));

        match app.detail_pane() {
            DetailPane::Ready { post, .. } => assert_eq!(post.title, "B"),
            other => panic!("expected B, got {other:?}"),
        }
    }

    #[test]
    fn late_detail_arriving_first_does_not_flash() {
        let mut app = loaded(&[("a", "A"), ("b", "B")]);
        let for_a = single(app.select(PostId::new("a")));
        let for_b = single(app.select(PostId::new("b")));

        app.handle_response(for_a.id, ok(200, &post_json("a", "A")));
        assert_eq!(app.detail_pane(), DetailPane::Loading);
        app.handle_response(for_b.id, ok(200, &post_json("b", "B")));
        assert!(matches!(app.detail_pane(), DetailPane::Ready { post, .. } if post.title == "B"));
    }

    #[test]
    fn create_posts_uppercased_category_then_refetches_list() {
        let mut app = loaded(&[("1", "First")]);
        app.open_form();
        let cmd = single(
            app.submit_form(PostForm::new("Second", "fintech", "Body"), now())
                .unwrap(),
        );
        assert_eq!(cmd.request.method, HttpMethod::Post);
        let body: serde_json::Value =
            serde_json::from_str(cmd.request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["category"], serde_json::json!(["FINTECH"]));
        assert_eq!(app.form_pane(), Some(FormPane { publishing: true, error: None }));

        let refetch = single(app.handle_response(cmd.id, ok(201, &post_json("2", "Second"))));
        assert_eq!(refetch.request.path, "http://store/blogs");
        assert_eq!(app.form_pane(), None);
        // stale list stays visible while re-fetching
        assert!(matches!(app.list_pane(), ListPane::Ready { refreshing: true, .. }));
        assert_eq!(titles(&app), vec!["First"]);

        let body = format!("[{},{}]", post_json("1", "First"), post_json("2", "Second"));
        app.handle_response(refetch.id, ok(200, &body));
        assert_eq!(titles(&app), vec!["First", "Second"]);
    }

    #[test]
    fn empty_title_issues_no_request() {
        let mut app = loaded(&[]);
        app.open_form();
        let err = app
            .submit_form(PostForm::new("", "tech", "Body"), now())
            .unwrap_err();
        assert!(matches!(err, FormError::Invalid(_)));
        assert!(app.is_idle());
        assert_eq!(app.create_state(), &MutationState::Idle);
    }

    #[test]
    fn second_submit_while_pending_is_ignored() {
        let mut app = loaded(&[]);
        app.open_form();
        single(app.submit_form(PostForm::new("T", "c", "b"), now()).unwrap());
        let again = app.submit_form(PostForm::new("T", "c", "b"), now()).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn second_delete_while_pending_skips_prompt() {
        let mut app = loaded(&[("1", "First"), ("2", "Second")]);
        single(app.delete(PostId::new("1"), &mut |_: &str| true));

        let mut prompts = 0;
        let again = app.delete(PostId::new("2"), &mut |_: &str| {
            prompts += 1;
            true
        });
        assert!(again.is_empty());
        assert_eq!(prompts, 0);
        assert!(app.delete_state().is_pending());
    }

    #[test]
    fn closing_form_keeps_pending_create() {
        let mut app = loaded(&[("1", "First")]);
        app.open_form();
        let cmd = single(app.submit_form(PostForm::new("Second", "tech", "Body"), now()).unwrap());
        app.close_form();
        assert_eq!(app.form_pane(), None);
        assert!(app.create_state().is_pending());

        let refetch = single(app.handle_response(cmd.id, ok(201, &post_json("2", "Second"))));
        assert_eq!(refetch.request.path, "http://store/blogs");
        assert_eq!(app.create_state(), &MutationState::Idle);
    }

    #[test]
    fn failed_create_keeps_form_open() {
        let mut app = loaded(&[]);
        app.open_form();
        let cmd = single(app.submit_form(PostForm::new("T", "c", "b"), now()).unwrap());
        let follow = app.handle_response(cmd.id, ok(500, "nope"));
        assert!(follow.is_empty());
        assert_eq!(
            app.form_pane(),
            Some(FormPane {
                publishing: false,
                error: Some("HTTP 500: nope")
            })
        );
    }

    #[test]
    fn declined_delete_issues_nothing() {
        let mut app = loaded(&[("1", "First")]);
        let mut asked = Vec::new();
        let commands = app.delete(PostId::new("1"), &mut |msg: &str| {
            asked.push(msg.to_string());
            false
        });
        assert!(commands.is_empty());
        assert_eq!(asked, vec![DELETE_PROMPT.to_string()]);
        assert!(app.is_idle());
    }

    #[test]
    fn delete_of_selected_clears_detail_and_refetches_list() {
        let mut app = loaded(&[("1", "First"), ("2", "Second")]);
        let cmd = single(app.select(PostId::new("1")));
        app.handle_response(cmd.id, ok(200, &post_json("1", "First")));

        let del = single(app.delete(PostId::new("1"), &mut |_: &str| true));
        assert_eq!(del.request.method, HttpMethod::Delete);
        assert!(matches!(app.detail_pane(), DetailPane::Ready { deleting: true, .. }));

        let refetch = single(app.handle_response(del.id, ok(200, "{}")));
        assert_eq!(app.detail_pane(), DetailPane::Empty);
        assert_eq!(app.selected(), None);
        assert!(app.cache().get(&QueryKey::Post(PostId::new("1"))).is_none());

        app.handle_response(refetch.id, ok(200, &format!("[{}]", post_json("2", "Second"))));
        assert_eq!(titles(&app), vec!["Second"]);
    }

    #[test]
    fn failed_delete_keeps_selection() {
        let mut app = loaded(&[("1", "First")]);
        let cmd = single(app.select(PostId::new("1")));
        app.handle_response(cmd.id, ok(200, &post_json("1", "First")));

        let del = single(app.delete(PostId::new("1"), &mut |_: &str| true));
        let follow = app.handle_response(
            del.id,
            Err(ApiError::TransportError("connection refused".to_string())),
        );
        assert!(follow.is_empty());
        assert_eq!(app.selected(), Some(&PostId::new("1")));
        assert!(matches!(app.delete_state(), MutationState::Failed(_)));
        assert!(matches!(app.detail_pane(), DetailPane::Ready { deleting: false, .. }));
    }

    #[test]
    fn deleting_another_post_keeps_selection() {
        let mut app = loaded(&[("1", "First"), ("2", "Second")]);
        let cmd = single(app.select(PostId::new("1")));
        app.handle_response(cmd.id, ok(200, &post_json("1", "First")));

        let del = single(app.delete(PostId::new("2"), &mut |_: &str| true));
        app.handle_response(del.id, ok(200, "{}"));
        assert_eq!(app.selected(), Some(&PostId::new("1")));
    }

    #[test]
    fn list_error_is_surfaced() {
        let mut app = app();
        let cmd = single(app.mount());
        app.handle_response(cmd.id, ok(503, "down"));
        assert_eq!(
            app.list_pane(),
            ListPane::Failed {
                message: "HTTP 503: down",
                posts: &[]
            }
        );
        // errored queries are retried on the next mount
        assert_eq!(app.mount().len(), 1);
    }

    #[test]
    fn missing_post_shows_failed_detail() {
        let mut app = loaded(&[]);
        let cmd = single(app.select(PostId::new("gone")));
        app.handle_response(cmd.id, ok(404, ""));
        assert_eq!(app.detail_pane(), DetailPane::Failed("resource not found"));
    }

    #[test]
    fn unknown_response_is_ignored() {
        let mut app = loaded(&[]);
        assert!(app
            .handle_response(RequestId(999), ok(200, "[]"))
            .is_empty());
    }

    #[test]
    fn refresh_refetches_list() {
        let mut app = loaded(&[("1", "First")]);
        let cmd = single(app.refresh());
        assert_eq!(cmd.request.path, "http://store/blogs");
        assert!(matches!(app.list_pane(), ListPane::Ready { refreshing: true, .. }));
    }
}
