use std::{path::Path, sync::Arc};

use axum::{
    extract::{Path as UrlPath, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
    pub date: String,
    pub cover_image: String,
}

/// Older json-server databases use integer ids; they are kept as text.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Body of `POST /blogs`. Any `id` the caller sends is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub title: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
    pub date: String,
    pub cover_image: String,
}

/// json-server style database file: `{ "blogs": [...] }`.
#[derive(Deserialize)]
struct Seed {
    #[serde(default)]
    blogs: Vec<Post>,
}

pub type Db = Arc<RwLock<Vec<Post>>>;

pub fn app() -> Router {
    app_with(Vec::new())
}

pub fn app_with(posts: Vec<Post>) -> Router {
    let db: Db = Arc::new(RwLock::new(posts));
    Router::new()
        .route("/blogs", get(list_posts).post(create_post))
        .route("/blogs/{id}", get(get_post).delete(delete_post))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Vec::new()).await
}

pub async fn run_with(listener: TcpListener, posts: Vec<Post>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(posts)).await
}

/// Read the `blogs` collection out of a json-server database file.
pub async fn load_seed(path: impl AsRef<Path>) -> Result<Vec<Post>, std::io::Error> {
    let raw = tokio::fs::read_to_string(path).await?;
    let seed: Seed = serde_json::from_str(&raw)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    info!(count = seed.blogs.len(), "seed posts loaded");
    Ok(seed.blogs)
}

async fn list_posts(State(db): State<Db>) -> Json<Vec<Post>> {
    let posts = db.read().await;
    Json(posts.clone())
}

async fn create_post(
    State(db): State<Db>,
    Json(input): Json<CreatePost>,
) -> (StatusCode, Json<Post>) {
    let post = Post {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        category: input.category,
        description: input.description,
        content: input.content,
        date: input.date,
        cover_image: input.cover_image,
    };
    debug!(id = %post.id, "post stored");
    db.write().await.push(post.clone());
    (StatusCode::CREATED, Json(post))
}

async fn get_post(
    State(db): State<Db>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<Post>, StatusCode> {
    let posts = db.read().await;
    posts
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_post(
    State(db): State<Db>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<Post>, StatusCode> {
    let mut posts = db.write().await;
    let index = posts
        .iter()
        .position(|p| p.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    debug!(%id, "post removed");
    Ok(Json(posts.remove(index)))
}
