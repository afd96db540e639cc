use thiserror::Error;

/// Failures while acquiring a location fix.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location provider is turned off")]
    ProviderDisabled,

    #[error("location request timed out")]
    Timeout,

    #[error("location service unavailable: {0}")]
    Unavailable(String),
}

/// Failures while fetching the current weather.
///
/// None of these are surfaced to the user; the screen flow logs them and
/// moves on. A missing network never reaches the client at all, it is
/// caught by the connectivity check and shown as a notice instead.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("bad request (400)")]
    BadRequest,

    #[error("not found (404)")]
    NotFound,

    #[error("unexpected HTTP status {0}")]
    Http(u16),

    #[error("malformed weather payload: {0}")]
    Parse(#[from] serde_json::Error),
}
