//! Classification of failed round trips.
//!
//! These helpers only classify; the node never loops on retry.  Whether and
//! when to re-run an item is the host's decision, made from the
//! [`NodeError`](nodes::NodeError) variant.

use std::time::Duration;

use crate::DocuSignError;

/// Used when a throttled response carries no usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

fn status(error: &DocuSignError) -> Option<u16> {
    match error {
        DocuSignError::Transport(e) => e.status,
        _ => None,
    }
}

/// True when the transport reported HTTP 429.
pub fn is_rate_limit_error(error: &DocuSignError) -> bool {
    status(error) == Some(429)
}

/// True for 429 and 5xx.  Other 4xx statuses mean the request itself is
/// wrong and will fail again unchanged.
pub fn is_retryable_error(error: &DocuSignError) -> bool {
    matches!(status(error), Some(429) | Some(500..=599))
}

/// Seconds to wait before retrying, from a numeric `Retry-After` header,
/// otherwise [`DEFAULT_RETRY_AFTER`].
pub fn retry_after_seconds(error: &DocuSignError) -> u64 {
    retry_after_or(error, DEFAULT_RETRY_AFTER)
}

/// Like [`retry_after_seconds`] with a caller-chosen fallback.
pub fn retry_after_or(error: &DocuSignError, fallback: Duration) -> u64 {
    match error {
        DocuSignError::Transport(e) => e
            .header("retry-after")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(fallback.as_secs()),
        _ => fallback.as_secs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodes::TransportError;

    fn http(status: u16) -> DocuSignError {
        TransportError::http(status, "x").into()
    }

    #[test]
    fn rate_limit_is_only_429() {
        assert!(is_rate_limit_error(&http(429)));
        assert!(!is_rate_limit_error(&http(500)));
        assert!(!is_rate_limit_error(&http(400)));
        assert!(!is_rate_limit_error(&DocuSignError::validation("x is required")));
    }

    #[test]
    fn retryable_statuses() {
        for s in [429, 500, 502, 503, 504, 599] {
            assert!(is_retryable_error(&http(s)), "{s} should be retryable");
        }
        for s in [400, 401, 403, 404, 409, 422] {
            assert!(!is_retryable_error(&http(s)), "{s} should not be retryable");
        }
        assert!(!is_retryable_error(&TransportError::network("reset").into()));
    }

    #[test]
    fn retry_after_reads_numeric_header() {
        let err: DocuSignError = TransportError::http(429, "x").with_header("Retry-After", "42").into();
        assert_eq!(retry_after_seconds(&err), 42);
    }

    #[test]
    fn retry_after_falls_back_for_missing_or_date_header() {
        assert_eq!(retry_after_seconds(&http(429)), 5);

        let dated: DocuSignError = TransportError::http(429, "x")
            .with_header("Retry-After", "Wed, 21 Oct 2026 07:28:00 GMT")
            .into();
        assert_eq!(retry_after_seconds(&dated), 5);
        assert_eq!(retry_after_or(&dated, Duration::from_secs(9)), 9);
    }
}
