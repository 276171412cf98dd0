//! Generic HTTP fetching with retry, backoff and error classification

use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::retry::RetryPolicy;
use crate::error::AppError;

/// One failed attempt, with the server's `Retry-After` hint if it sent one.
struct AttemptFailure {
    error: AppError,
    retry_after: Option<Duration>,
}

impl From<AppError> for AttemptFailure {
    fn from(error: AppError) -> Self {
        AttemptFailure {
            error,
            retry_after: None,
        }
    }
}

/// Fetches `url` and parses the JSON body, retrying transient failures.
///
/// - Timeouts, connection errors and 5xx wait `policy.retry_delay`
/// - 429 waits `policy.rate_limit_delay(attempt)`, or longer if the server
///   asks for it via `Retry-After` (up to `policy.max_backoff`); successive
///   rate-limit waits never shrink. `Retry-After` may be delta-seconds or an
///   HTTP date
/// - Statuses outside 2xx, 4xx and 5xx (e.g. an unfollowed 3xx) are not retried
/// - 404, other 4xx and undecodable bodies fail immediately
/// - After `policy.max_attempts` attempts the last cause is returned wrapped
///   in `AppError::FetchExhausted`
#[instrument(skip(client, policy))]
pub(super) async fn fetch<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    policy: &RetryPolicy,
) -> Result<T, AppError> {
    info!("Fetching data from URL: {url}");

    let mut attempt = 1u32;
    let mut last_rate_limit_wait = Duration::ZERO;

    loop {
        let failure = match fetch_once::<T>(client, url).await {
            Ok(parsed) => return Ok(parsed),
            Err(failure) => failure,
        };

        if !failure.error.is_retryable() {
            error!("Request for {url} failed permanently: {}", failure.error);
            return Err(failure.error);
        }

        if !policy.allows_retry_after(attempt) {
            error!(
                "Request for {url} failed after {attempt} attempt(s): {}",
                failure.error
            );
            return Err(AppError::fetch_exhausted(attempt, failure.error));
        }

        let mut wait = policy.delay_for(&failure.error, attempt);
        if failure.error.is_rate_limit() {
            if let Some(retry_after) = failure.retry_after {
                wait = wait.max(retry_after.min(policy.max_backoff));
            }
            wait = wait.max(last_rate_limit_wait);
            last_rate_limit_wait = wait;
        }

        warn!(
            "{}. Retrying in {:?} (attempt {}/{})",
            failure.error, wait, attempt, policy.max_attempts
        );
        tokio::time::sleep(wait).await;
        attempt += 1;
    }
}

async fn fetch_once<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, AttemptFailure> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_request_error(e, url))?;

    let status = response.status();
    debug!("Response status: {status}");

    if !status.is_success() {
        return Err(status_failure(response, url));
    }

    let response_text = response
        .text()
        .await
        .map_err(|e| classify_request_error(e, url))?;

    debug!("Response length: {} bytes", response_text.len());
    let preview: String = response_text.chars().take(512).collect();
    debug!("Response text (first 512 chars): {preview}");

    parse_body(&response_text, url).map_err(AttemptFailure::from)
}

fn classify_request_error(e: reqwest::Error, url: &str) -> AttemptFailure {
    let error = if e.is_timeout() {
        AppError::network_timeout(url)
    } else if e.is_connect() {
        AppError::network_connection(url, e.to_string())
    } else {
        AppError::ApiFetch(e)
    };
    error.into()
}

fn status_failure(response: Response, url: &str) -> AttemptFailure {
    let status = response.status();
    let status_code = status.as_u16();
    let reason = status.canonical_reason().unwrap_or("Unknown error");

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_retry_after);

    let error = match status_code {
        404 => AppError::api_not_found(url),
        429 => AppError::api_rate_limit(reason, url),
        400..=499 => AppError::api_client_error(status_code, reason, url),
        500..=599 => AppError::api_server_error(status_code, reason, url),
        _ => AppError::api_unexpected_structure(
            format!("Unexpected HTTP status {status_code} {reason}"),
            url,
        ),
    };

    AttemptFailure { error, retry_after }
}

/// `Retry-After` as delta-seconds or an HTTP date. A date in the past means no wait.
fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let date = DateTime::parse_from_rfc2822(value).ok()?;
    Some(
        (date.with_timezone(&Utc) - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO),
    )
}

fn parse_body<T: DeserializeOwned>(response_text: &str, url: &str) -> Result<T, AppError> {
    match serde_json::from_str::<T>(response_text) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            error!("Failed to parse API response: {} (URL: {})", e, url);

            let trimmed = response_text.trim_start();
            if trimmed.is_empty() {
                Err(AppError::api_malformed_json("Response body is empty", url))
            } else if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
                Err(AppError::api_malformed_json("Response is not valid JSON", url))
            } else if e.is_syntax() || e.is_eof() {
                Err(AppError::api_malformed_json(e.to_string(), url))
            } else {
                Err(AppError::api_unexpected_structure(e.to_string(), url))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::api::http_client::{
        create_http_client_with_timeout, create_test_http_client,
    };
    use serde_json::Value;
    use std::time::Instant;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            retry_delay: Duration::from_millis(1),
            rate_limit_base: Duration::from_millis(1),
            max_backoff: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[1, 2, 3]"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let result: Vec<i32> = fetch(&client, &mock_server.uri(), &fast_policy(3))
            .await
            .unwrap();
        assert_eq!(result, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_up_to_the_bound() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let result: Result<Value, _> = fetch(&client, &mock_server.uri(), &fast_policy(3)).await;

        match result {
            Err(AppError::FetchExhausted { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, AppError::ApiServerError { status: 500, .. }));
            }
            other => panic!("Expected FetchExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let result: Vec<Value> = fetch(&client, &mock_server.uri(), &fast_policy(3))
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .expect(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let result: Result<Vec<Value>, _> =
            fetch(&client, &mock_server.uri(), &fast_policy(3)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_retry_after_is_honoured_within_cap() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&mock_server)
            .await;

        let policy = RetryPolicy {
            max_backoff: Duration::from_millis(150),
            ..fast_policy(2)
        };
        let client = create_test_http_client();
        let started = Instant::now();
        let result: Result<Vec<Value>, _> = fetch(&client, &mock_server.uri(), &policy).await;

        assert!(result.is_ok());
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_rate_limit_wait_does_not_shrink_when_retry_after_drops() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let policy = RetryPolicy {
            max_backoff: Duration::from_millis(200),
            ..fast_policy(3)
        };
        let client = create_test_http_client();
        let started = Instant::now();
        let result: Result<Vec<Value>, _> = fetch(&client, &mock_server.uri(), &policy).await;

        assert!(result.is_ok());
        // 200ms for the capped first wait, and at least as long for the second
        assert!(started.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_continuous_rate_limit_is_exhausted() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let result: Result<Value, _> = fetch(&client, &mock_server.uri(), &fast_policy(3)).await;

        match result {
            Err(AppError::FetchExhausted { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, AppError::ApiRateLimit { .. }));
            }
            other => panic!("Expected exhausted rate limiting, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unfollowed_redirect_status_is_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(300))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let result: Result<Value, _> = fetch(&client, &mock_server.uri(), &fast_policy(3)).await;
        assert!(matches!(
            result,
            Err(AppError::ApiUnexpectedStructure { .. })
        ));
    }

    #[test]
    fn test_parse_retry_after_forms() {
        assert_eq!(parse_retry_after("120"), Some(Duration::from_secs(120)));
        assert_eq!(parse_retry_after(" 0 "), Some(Duration::ZERO));
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"),
            Some(Duration::ZERO)
        );

        let future = (Utc::now() + chrono::Duration::seconds(90)).to_rfc2822();
        let wait = parse_retry_after(&future).unwrap();
        assert!(wait > Duration::from_secs(80) && wait <= Duration::from_secs(90));

        assert_eq!(parse_retry_after("soon"), None);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let result: Result<Value, _> = fetch(&client, &mock_server.uri(), &fast_policy(3)).await;
        assert!(matches!(result, Err(AppError::ApiNotFound { .. })));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let result: Result<Value, _> = fetch(&client, &mock_server.uri(), &fast_policy(3)).await;
        assert!(matches!(
            result,
            Err(AppError::ApiClientError { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("[]")
                    .set_delay(Duration::from_millis(500)),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = create_http_client_with_timeout(Duration::from_millis(50)).unwrap();
        let result: Result<Value, _> = fetch(&client, &mock_server.uri(), &fast_policy(2)).await;

        match result {
            Err(AppError::FetchExhausted { attempts, source }) => {
                assert_eq!(attempts, 2);
                assert!(matches!(*source, AppError::NetworkTimeout { .. }));
            }
            other => panic!("Expected exhausted timeouts, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_exhausted() {
        // Bind and drop a listener to get a port nothing listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{port}/matches.json");

        let client = create_test_http_client();
        let result: Result<Value, _> = fetch(&client, &url, &fast_policy(2)).await;
        match result {
            Err(AppError::FetchExhausted { attempts, source }) => {
                assert_eq!(attempts, 2);
                assert!(matches!(*source, AppError::NetworkConnection { .. }));
            }
            other => panic!("Expected exhausted connection errors, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_body_classification() {
        let empty = parse_body::<Value>("   ", "u").unwrap_err();
        assert!(matches!(empty, AppError::ApiMalformedJson { .. }));

        let html = parse_body::<Value>("<html>", "u").unwrap_err();
        assert!(matches!(html, AppError::ApiMalformedJson { .. }));

        let truncated = parse_body::<Value>("[{\"id\": 1", "u").unwrap_err();
        assert!(matches!(truncated, AppError::ApiMalformedJson { .. }));

        let wrong_shape = parse_body::<Vec<Value>>("{\"error\": \"nope\"}", "u").unwrap_err();
        assert!(matches!(wrong_shape, AppError::ApiUnexpectedStructure { .. }));
    }
}
