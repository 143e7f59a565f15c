use thiserror::Error;

/// Failures on the remote listing path.
///
/// `BreakerOpen` means the call was rejected without touching the network and
/// must stay distinguishable from a genuine remote failure: it does not count
/// toward the breaker's failure threshold.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("circuit breaker is open")]
    BreakerOpen,

    #[error("remote returned HTTP {0}")]
    Http(u16),

    #[error("remote request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed listing payload: {0}")]
    Payload(String),
}
