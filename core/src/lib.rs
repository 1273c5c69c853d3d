//! Async API client core for the animal spotter service.
//!
//! # Overview
//! Signs users up and in, lists reported sightings, fetches a sighting's
//! details and downloads its image. Each operation is one HTTP round trip
//! yielding a typed value or one `ApiError` kind.
//!
//! # Design
//! - `SpotterClient` splits each operation into `build_*` (produces request)
//!   and `parse_*` (consumes the transport outcome); the async methods run the
//!   round trip through a pluggable `Transport`.
//! - The bearer token lives in a `Session` handle that callers share by
//!   cloning instead of reaching for a global.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;
pub mod types;

pub use client::SpotterClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, TransportError};
pub use http::{Exchange, HttpMethod, HttpRequest, HttpResponse, Transport};
pub use session::Session;
pub use transport::UreqTransport;
pub use types::{Animal, AnimalImage, BearerToken, Credentials};
