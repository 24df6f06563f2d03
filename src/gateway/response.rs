//! Wire types for the posts query.
//!
//! Field names follow the remote schema (`Media`, `Creator`), so they are
//! renamed explicitly. Everything the platform may omit is optional.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct QueryRequest<'a> {
    pub(crate) query: &'a str,
    pub(crate) variables: QueryVariables,
}

#[derive(Debug, Serialize)]
pub(crate) struct QueryVariables {
    pub(crate) take: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub(crate) data: Option<PostsData>,
    #[serde(default)]
    pub(crate) errors: Option<Vec<QueryErrorEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryErrorEntry {
    #[serde(default)]
    pub(crate) message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostsData {
    #[serde(default)]
    pub(crate) posts: Option<PostsPage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostsPage {
    #[serde(default)]
    pub(crate) items: Option<Vec<PostItem>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostItem {
    #[serde(rename = "Media", default)]
    pub(crate) media: Option<PostMedia>,
    #[serde(rename = "Creator", default)]
    pub(crate) creator: Option<PostCreator>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostMedia {
    #[serde(default)]
    pub(crate) url: Option<String>,
    #[serde(default)]
    pub(crate) ext: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostCreator {
    #[serde(default)]
    pub(crate) username: Option<String>,
}
