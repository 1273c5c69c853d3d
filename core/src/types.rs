//! Domain DTOs for the animal spotter API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Wire names follow the remote API (`timeSeen`, `imageURL`); integration
//! tests catch any schema drift between the two crates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Username/password pair sent as the JSON body of sign-up and sign-in.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque session token returned by a successful sign-in.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BearerToken {
    pub token: String,
}

impl BearerToken {
    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// A single reported sighting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: i64,
    pub name: String,
    #[serde(with = "seconds_since_epoch")]
    pub time_seen: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

/// Image payload that was verified to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimalImage {
    pub format: image::ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// `timeSeen` travels as seconds since 1970-01-01T00:00:00Z, integer or
/// fractional.
mod seconds_since_epoch {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = value.timestamp_subsec_nanos();
        if nanos == 0 {
            serializer.serialize_i64(value.timestamp())
        } else {
            serializer.serialize_f64(value.timestamp() as f64 + f64::from(nanos) / NANOS_PER_SECOND)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        if !seconds.is_finite() {
            return Err(de::Error::custom("timestamp is not a finite number"));
        }
        let whole = seconds.floor();
        let mut secs = whole as i64;
        let mut nanos = ((seconds - whole) * NANOS_PER_SECOND).round() as u32;
        if nanos >= 1_000_000_000 {
            secs += 1;
            nanos = 0;
        }
        DateTime::from_timestamp(secs, nanos)
            .ok_or_else(|| de::Error::custom(format!("timestamp {seconds} is out of range")))
    }
}
