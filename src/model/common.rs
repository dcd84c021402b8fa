use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ProjectionError;
use crate::projection::day;

/// Identity of a game (uuid assigned by the service).
pub type GameId = String;

/// Identity of an uploaded game image.
pub type ImageId = i64;

/// Identity of a recorded play session.
pub type PlayId = i64;

/// A timestamp exactly as delivered by the service.
///
/// Parsing is deferred to the projections so a single malformed row can be
/// excluded instead of failing the whole response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a UTC instant.
    pub fn parse(&self) -> Result<DateTime<Utc>, ProjectionError> {
        day::parse_timestamp(&self.0)
    }
}

impl From<&str> for Timestamp {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a string column through `FromStr`, falling back to the default for
/// `null` or unrecognized values.
pub(crate) fn lenient_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr + Default,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()).unwrap_or_default())
}
