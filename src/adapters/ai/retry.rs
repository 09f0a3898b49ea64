//! Retry and error-mapping helpers shared by the HTTP providers.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::ports::AIError;

/// Runs `attempt` until it succeeds, fails with a non-retryable error, or
/// `max_retries` retries are used up. Backs off 1s, 2s, 4s, ...
pub async fn retry_with_backoff<T, F, Fut>(max_retries: u32, mut attempt: F) -> Result<T, AIError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AIError>>,
{
    let mut retry_count: u32 = 0;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() || retry_count >= max_retries => return Err(err),
            Err(err) => {
                let delay = Duration::from_secs(1 << retry_count.min(6));
                debug!(error = %err, retry_count, delay_secs = delay.as_secs(), "Retrying completion");
                sleep(delay).await;
                retry_count += 1;
            }
        }
    }
}

/// Maps a reqwest send failure to the matching `AIError`.
pub fn map_send_error(err: reqwest::Error, timeout: Duration) -> AIError {
    if err.is_timeout() {
        AIError::timeout(timeout.as_secs() as u32)
    } else if err.is_connect() {
        AIError::network(format!("Connection failed: {}", err))
    } else {
        AIError::network(err.to_string())
    }
}

/// Parses "try again in Ns" from a JSON error body, or returns `default`.
pub fn parse_retry_after(error_body: &str, default: u32) -> u32 {
    serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|parsed| {
            let message = parsed.get("error")?.get("message")?.as_str()?.to_string();
            let rest = &message[message.find("try again in ")? + "try again in ".len()..];
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<u32>().ok()
        })
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn retries_retryable_errors_until_success() {
        let attempts = AtomicU32::new(0);
        let result = retry_with_backoff(3, || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(AIError::unavailable("busy"))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), AIError> = retry_with_backoff(2, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(AIError::network("reset")) }
        })
        .await;

        assert!(matches!(result, Err(AIError::Network(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), AIError> = retry_with_backoff(3, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(AIError::AuthenticationFailed) }
        })
        .await;

        assert!(matches!(result, Err(AIError::AuthenticationFailed)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn parse_retry_after_reads_message() {
        let body = r#"{"error":{"message":"Rate limit exceeded. Please try again in 30 seconds."}}"#;
        assert_eq!(parse_retry_after(body, 5), 30);
    }

    #[test]
    fn parse_retry_after_falls_back_to_default() {
        assert_eq!(parse_retry_after(r#"{"error":{"message":"nope"}}"#, 60), 60);
        assert_eq!(parse_retry_after("not json", 30), 30);
    }
}
