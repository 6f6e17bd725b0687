#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw acquisition records: news articles and social-media posts.
//!
//! These are the inputs handed to the extraction stage. They carry text
//! evidence only; place names are pulled out of them later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A candidate news article about an ongoing disaster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    /// Headline.
    pub title: String,
    /// Article body (often truncated by the news API).
    #[serde(default)]
    pub content: String,
    /// Canonical article URL, if the source reported one.
    #[serde(default)]
    pub url: Option<String>,
    /// Publication time, if the source reported one.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// A social-media post mentioning local conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialPost {
    /// Account handle.
    pub author: String,
    /// Post text.
    pub content: String,
    /// When the post was published.
    pub timestamp: DateTime<Utc>,
}

/// Renders posts as a Markdown table for inclusion in a prompt.
///
/// Pipe characters inside post text are escaped so each post stays on a
/// single table row.
#[must_use]
pub fn posts_to_markdown(posts: &[SocialPost]) -> String {
    let mut out = String::from("| author | content | timestamp |\n|---|---|---|\n");
    for post in posts {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&post.author),
            escape_cell(&post.content),
            post.timestamp.to_rfc3339(),
        ));
    }
    out
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
