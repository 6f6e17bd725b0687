//! HTTP retry helpers for transient errors.
//!
//! Acquisition clients should use [`send_json`] instead of calling
//! `reqwest::RequestBuilder::send()` directly, so every request gets
//! retried with exponential backoff on timeouts, connection resets,
//! server errors, and rate limiting.
//!
//! ```ignore
//! let body = retry::send_json(|| client.get(&url).query(&params)).await?;
//! ```

use std::time::Duration;

use crate::SourceError;

/// Maximum number of retry attempts for transient HTTP errors.
///
/// With exponential backoff (2s, 4s, 8s) the total wait before giving up
/// is 14 seconds, well inside one cycle interval.
const MAX_RETRIES: u32 = 3;

/// Maximum length of the response body preview included in errors.
const BODY_PREVIEW_LEN: usize = 300;

/// Sends an HTTP request and parses the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (builders are consumed by `.send()`).
///
/// Does **not** retry HTTP 4xx (except 429); those are permanent. A 4xx
/// body is still returned as an error message because APIs such as
/// `NewsAPI` explain rejected keys and bad queries there.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails after all retries, the
/// server returns a non-retryable status code, or the body is not JSON.
pub async fn send_json<F>(build_request: F) -> Result<serde_json::Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, MAX_RETRIES).await?;
    let status = response.status();
    let text = response.text().await?;

    if status.is_client_error() {
        return Err(SourceError::Upstream {
            message: format!("HTTP {status}: {}", preview(&text)),
        });
    }

    serde_json::from_str(&text).map_err(|e| {
        log::error!(
            "JSON parse failed (status {status}, {} bytes): {e}\n  body preview: {}",
            text.len(),
            preview(&text),
        );
        SourceError::Json(e)
    })
}

/// Core retry loop. Returns the first response that is not a transient
/// failure; 4xx responses other than 429 are returned as-is.
async fn send_inner<F>(
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    attempt += 1;
                    continue;
                }
                return Err(SourceError::Http(e));
            }
            Ok(response) => {
                let status = response.status();
                let retryable = status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    || status.is_server_error();

                if !retryable {
                    return Ok(response);
                }

                if attempt < max_retries {
                    log::warn!("  HTTP {status}, will retry");
                    attempt += 1;
                    continue;
                }

                return Err(SourceError::Upstream {
                    message: format!("HTTP {status} after {max_retries} retries"),
                });
            }
        }
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

fn preview(text: &str) -> &str {
    if text.len() <= BODY_PREVIEW_LEN {
        return text;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundary() {
        let text = "é".repeat(BODY_PREVIEW_LEN);
        let cut = preview(&text);
        assert!(cut.len() <= BODY_PREVIEW_LEN);
        assert!(cut.chars().all(|c| c == 'é'));
    }

    #[test]
    fn preview_keeps_short_text() {
        assert_eq!(preview("short"), "short");
    }
}
