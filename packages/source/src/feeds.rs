//! Compile-time embedded feeds.
//!
//! The sample social-media posts and the government-monitored location
//! list are TOML files under `feeds/`, embedded at compile time.

use polaris_source_models::SocialPost;
use serde::Deserialize;

const GOVERNMENT_TOML: &str = include_str!("../feeds/government.toml");
const SOCIAL_POSTS_TOML: &str = include_str!("../feeds/social_posts.toml");

#[derive(Deserialize)]
struct GovernmentFeed {
    locations: Vec<String>,
}

#[derive(Deserialize)]
struct SocialFeed {
    posts: Vec<SocialPost>,
}

/// Returns the embedded government-monitored locations.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the file is embedded and covered by tests).
#[must_use]
pub fn monitored_locations() -> Vec<String> {
    toml::de::from_str::<GovernmentFeed>(GOVERNMENT_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded government feed: {e}"))
        .locations
}

/// Returns the embedded sample social-media posts, oldest first.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed.
#[must_use]
pub fn sample_social_posts() -> Vec<SocialPost> {
    let mut posts = toml::de::from_str::<SocialFeed>(SOCIAL_POSTS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded social feed: {e}"))
        .posts;
    posts.sort_by_key(|p| p.timestamp);
    posts
}
