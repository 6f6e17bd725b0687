//! Prompt builders for the four extraction calls.
//!
//! Each call gets a system prompt describing the output schema and a
//! single user message carrying the inputs.

use chrono::{DateTime, SecondsFormat, Utc};
use polaris_source_models::NewsArticle;

/// System prompt for assessing a single news article.
#[must_use]
pub fn danger_record_system() -> String {
    r#"You extract structured data from news articles about natural disasters in Australia.

Answer with a single JSON object and nothing else:

{
  "title": "<headline, copied from the input>",
  "location": "<most specific place affected: [Street or landmark], [Suburb], [City], [State], Australia>",
  "disaster_type": "<lowercase disaster type, e.g. bushfire, flood, storm>",
  "emergency_no": "<emergency contact number in the article, or empty string>",
  "danger_level": <integer 1-5>,
  "summary": "<at most two sentences on how the disaster is developing>"
}

Danger scale:
1 = safe
2 = safe but exercise caution
3 = do not go unless necessary
4 = dangerous
5 = potential for loss of life

Avoid vague regions when the article names a more specific place."#
        .to_string()
}

/// User message carrying one article.
#[must_use]
pub fn danger_record_user(article: &NewsArticle) -> String {
    format!(
        "Title: {}\n\nContent:\n{}",
        article.title.trim(),
        article.content.trim()
    )
}

/// System prompt for correlating social posts with monitored locations.
#[must_use]
pub fn location_status_system() -> String {
    r#"You analyse social-media posts to decide whether government-monitored locations are affected by a natural disaster.

For every monitored location:
- Match posts that mention it, case-insensitively and allowing partial matches
  (e.g. "Churchill National Park" matches "Churchill National Park, Rowville, VIC, Australia").
- Mark it "dangerous" if a matching post mentions a disaster (fire, flood, storm, smoke, evacuation, ...).
- Otherwise mark it "not_dangerous".

Answer with a JSON object and nothing else:

{
  "locations": [
    { "location_name": "<location exactly as listed>", "status": "dangerous" | "not_dangerous" }
  ]
}"#
    .to_string()
}

/// User message carrying the monitored locations and the posts table.
#[must_use]
pub fn location_status_user(government: &str, posts_markdown: &str) -> String {
    format!("Monitored locations:\n{government}\nPosts:\n{posts_markdown}")
}

/// System prompt for safety advice.
#[must_use]
pub fn advice_system() -> String {
    r#"You give practical safety advice to people near an active natural disaster.

Answer with a single JSON object and nothing else:

{
  "vehicle_advice": "<type of land vehicle suited to the conditions, e.g. large 4WD, small vehicle, motorbike>",
  "clothing_advice": "<protective clothing for the conditions, e.g. fire-resistant, waterproof, warm>",
  "general_advice": "<at most two sentences on how fast and unpredictable the disaster is and what to prepare for>"
}"#
    .to_string()
}

/// User message for advice.
#[must_use]
pub fn advice_user(twitter_insight: &str, disaster_type: &str) -> String {
    format!("Disaster type: {disaster_type}\n\nSocial-media insight:\n{twitter_insight}")
}

/// System prompt for predicting where the disaster spreads next.
#[must_use]
pub fn prediction_system() -> String {
    r#"You forecast where an active natural disaster in Australia is likely to spread next.

Use the social-media insight, the government-monitored locations and the disaster type.
Only name real places that can be found on a map, formatted as "[Suburb or park], [State], Australia".

Answer with a JSON object and nothing else:

{
  "predictions": [
    {
      "location": "<place name>",
      "predicted_time": "<the current time given in the input>",
      "time_of_impact": "<expected time of impact, RFC 3339>"
    }
  ]
}"#
    .to_string()
}

/// User message for prediction.
#[must_use]
pub fn prediction_user(
    twitter_insight: &str,
    gov_insight: &str,
    timestamp: DateTime<Utc>,
    disaster_type: &str,
) -> String {
    format!(
        "Current time: {}\nDisaster type: {disaster_type}\n\nSocial-media insight:\n{twitter_insight}\nGovernment-monitored locations:\n{gov_insight}",
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}
