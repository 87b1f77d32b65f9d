//! Shared HTTP plumbing for provider clients.
//!
//! Maps transport and status failures onto `CompletionError`:
//! 429 → RateLimited (Retry-After honored when numeric), request timeout →
//! Timeout, everything else → ServiceUnavailable.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::{Duration, Instant};

use super::{CompletionError, Provider};

/// Send a JSON body and return the parsed JSON response.
pub(crate) async fn post_json(
    request: reqwest::RequestBuilder,
    body: &Value,
    timeout: Duration,
    provider: Provider,
) -> Result<Value, CompletionError> {
    let start = Instant::now();

    let resp = request
        .timeout(timeout)
        .header("content-type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| transport_error(e, timeout))?;

    let status = resp.status();
    let retry_after = retry_after_secs(resp.headers());
    let text = resp.text().await.map_err(|e| transport_error(e, timeout))?;

    if !status.is_success() {
        log::error!("[LLM] {} returned {}: {}", provider, status, truncate(&text, 200));
        return Err(status_error(status, retry_after, &text));
    }

    log::info!(
        "[LLM] {} responded in {}ms ({} bytes)",
        provider,
        start.elapsed().as_millis(),
        text.len()
    );

    serde_json::from_str(&text)
        .map_err(|e| CompletionError::MalformedResponse(format!("invalid JSON body: {}", e)))
}

pub(crate) fn status_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> CompletionError {
    let detail = error_message(body).unwrap_or_else(|| truncate(body, 200).to_string());
    if status == StatusCode::TOO_MANY_REQUESTS {
        CompletionError::RateLimited {
            message: detail,
            retry_after_secs: retry_after,
        }
    } else {
        CompletionError::ServiceUnavailable(format!("HTTP {}: {}", status.as_u16(), detail))
    }
}

/// Numeric `Retry-After` only; HTTP-date values are ignored.
pub(crate) fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()
}

fn transport_error(e: reqwest::Error, timeout: Duration) -> CompletionError {
    if e.is_timeout() {
        log::warn!("[LLM] Request timed out after {}ms", timeout.as_millis());
        CompletionError::Timeout(timeout)
    } else {
        log::error!("[LLM] HTTP request failed: {}", e);
        CompletionError::ServiceUnavailable(e.to_string())
    }
}

/// `error.message` from a provider error body. All supported providers use
/// this shape; some send a bare string in `error` instead.
fn error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    let error = parsed.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
}

pub(crate) fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
