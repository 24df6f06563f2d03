//! Mock platform: a GraphQL endpoint plus the media files it points at.

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GRAPHQL_PATH: &str = "/graphql";

/// One post in the mocked feed.
pub struct MockPost {
    pub media_path: &'static str,
    pub ext: Option<&'static str>,
    pub username: &'static str,
}

impl MockPost {
    pub fn new(media_path: &'static str, ext: Option<&'static str>, username: &'static str) -> Self {
        Self {
            media_path,
            ext,
            username,
        }
    }
}

pub fn endpoint(server: &MockServer) -> String {
    format!("{}{GRAPHQL_PATH}", server.uri())
}

pub fn posts_body(server: &MockServer, posts: &[MockPost]) -> Value {
    let items: Vec<Value> = posts
        .iter()
        .map(|post| {
            json!({
                "Media": { "url": format!("{}{}", server.uri(), post.media_path), "ext": post.ext },
                "Creator": { "username": post.username },
            })
        })
        .collect();
    json!({ "data": { "posts": { "items": items } } })
}

/// Serves `posts` from the GraphQL endpoint.
pub async fn mount_posts(server: &MockServer, posts: &[MockPost]) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts_body(server, posts)))
        .mount(server)
        .await;
}

pub async fn mount_media(server: &MockServer, media_path: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(media_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

pub async fn mount_slow_media(server: &MockServer, media_path: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(media_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"late".to_vec())
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, media_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(media_path))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
