/// Malformed input met while shaping rows into projections.
///
/// These never abort a whole computation: the offending record is excluded,
/// or the affected filter falls back to its default.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// A record's timestamp could not be parsed.
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// A day key is not a well-formed `YYYY-MM-DD` calendar day.
    #[error("invalid day key: {0:?}")]
    InvalidDayKey(String),
}

/// All errors that can occur while talking to the collection service.
#[derive(thiserror::Error, Debug)]
pub enum LudothekError {
    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Service returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}: {body}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// Failed to read the response body.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// The response body did not match the expected row shape.
    #[error("failed to decode rows from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    /// The client configuration is incomplete or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A write was attempted without a signed-in caller.
    #[error("not signed in")]
    NotSignedIn,

    /// The caller does not own the record being changed.
    #[error("not authorized")]
    NotAuthorized,

    /// A record expected to exist was not returned by the service.
    #[error("not found: {what}")]
    NotFound { what: &'static str },

    /// User input was rejected before reaching the service.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

pub type Result<T> = std::result::Result<T, LudothekError>;
