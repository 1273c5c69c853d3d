//! Request builder, response parser and async operations for the animal
//! spotter API.
//!
//! # Design
//! Every operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes the transport outcome.
//! Both are pure; the async methods glue them to a `Transport` and, for
//! sign-in, write the decoded token into the shared `Session`.
//!
//! Authenticated endpoints check for a 401 before looking at transport
//! errors, so "sign in again" is never reported as "try again".

use image::GenericImageView;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{Exchange, HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::session::Session;
use crate::transport::UreqTransport;
use crate::types::{Animal, AnimalImage, BearerToken, Credentials};

const UNAUTHORIZED: u16 = 401;
const OK: u16 = 200;

/// Client for the animal spotter API.
///
/// Holds the base URL, the transport that executes round trips and the
/// session whose token authenticated calls present.
#[derive(Debug, Clone)]
pub struct SpotterClient<T> {
    base_url: Url,
    transport: T,
    session: Session,
}

impl SpotterClient<UreqTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, UreqTransport::new(config))
    }
}

impl<T> SpotterClient<T> {
    pub fn new(base_url: &str, transport: T) -> Result<Self, ApiError> {
        Self::with_session(base_url, transport, Session::new())
    }

    /// Use an existing session, shared with other components.
    pub fn with_session(base_url: &str, transport: T, session: Session) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url.trim()).map_err(|e| ApiError::MalformedUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::MalformedUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            transport,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Base URL with `segments` appended, each percent-encoded as one path
    /// segment.
    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        // cannot-be-a-base URLs are rejected by the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    fn bearer(&self) -> Result<BearerToken, ApiError> {
        self.session.token().ok_or(ApiError::NoToken)
    }

    pub fn build_sign_up(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_post(&["users", "signup"], credentials)
    }

    pub fn build_sign_in(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_post(&["users", "login"], credentials)
    }

    pub fn build_list_animal_names(&self) -> Result<HttpRequest, ApiError> {
        self.authorized_get(&["animals", "all"])
    }

    /// `name` becomes exactly one path segment, so names the URL parser would
    /// collapse (empty, `.`, `..`) are rejected before any request.
    pub fn build_fetch_details(&self, name: &str) -> Result<HttpRequest, ApiError> {
        if matches!(name, "" | "." | "..") {
            return Err(ApiError::MalformedUrl(format!("{name:?} is not a usable animal name")));
        }
        self.authorized_get(&["animals", name])
    }

    /// Image URLs are absolute and carry no authorization header.
    pub fn build_fetch_image(&self, url_text: &str) -> Result<HttpRequest, ApiError> {
        let url = Url::parse(url_text.trim()).map_err(|e| ApiError::MalformedUrl(format!("{url_text}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::MalformedUrl(format!("{url_text}: unsupported scheme")));
        }
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        })
    }

    fn json_post(&self, segments: &[&str], credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(credentials).map_err(|e| ApiError::RequestFailed(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.endpoint(segments),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    fn authorized_get(&self, segments: &[&str]) -> Result<HttpRequest, ApiError> {
        let token = self.bearer()?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: self.endpoint(segments),
            headers: vec![("authorization".to_string(), token.header_value())],
            body: None,
        })
    }

    pub fn parse_sign_up(&self, outcome: Exchange) -> Result<(), ApiError> {
        expect_ok(outcome)?;
        Ok(())
    }

    pub fn parse_sign_in(&self, outcome: Exchange) -> Result<BearerToken, ApiError> {
        let body = non_empty(expect_ok(outcome)?)?;
        let token: BearerToken = decode(&body)?;
        if token.token.is_empty() {
            return Err(ApiError::DecodeFailed("token is empty".to_string()));
        }
        Ok(token)
    }

    pub fn parse_list_animal_names(&self, outcome: Exchange) -> Result<Vec<String>, ApiError> {
        decode(&authorized_body(outcome)?)
    }

    pub fn parse_fetch_details(&self, outcome: Exchange) -> Result<Animal, ApiError> {
        decode(&authorized_body(outcome)?)
    }

    pub fn parse_fetch_image(&self, outcome: Exchange) -> Result<AnimalImage, ApiError> {
        let bytes = non_empty(expect_ok(outcome)?)?;
        let format =
            image::guess_format(&bytes).map_err(|e| ApiError::DecodeFailed(format!("unrecognized image data: {e}")))?;
        let decoded = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| ApiError::DecodeFailed(format!("invalid {format:?} image: {e}")))?;
        let (width, height) = decoded.dimensions();
        Ok(AnimalImage {
            format,
            width,
            height,
            bytes,
        })
    }
}

impl<T: Transport> SpotterClient<T> {
    /// Register a new account. Does not sign in.
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let request = self.build_sign_up(credentials)?;
        let outcome = self.round_trip(request).await;
        self.parse_sign_up(outcome)
            .inspect_err(|e| tracing::warn!(username = %credentials.username, error = %e, "sign up failed"))
    }

    /// Sign in and replace the session token on success.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let request = self.build_sign_in(credentials)?;
        let outcome = self.round_trip(request).await;
        let token = self
            .parse_sign_in(outcome)
            .inspect_err(|e| tracing::warn!(username = %credentials.username, error = %e, "sign in failed"))?;
        self.session.store(token);
        tracing::info!(username = %credentials.username, "signed in");
        Ok(())
    }

    pub async fn fetch_all_animal_names(&self) -> Result<Vec<String>, ApiError> {
        let request = self.build_list_animal_names()?;
        let outcome = self.round_trip(request).await;
        self.parse_list_animal_names(outcome)
            .inspect_err(|e| tracing::warn!(error = %e, "fetching animal names failed"))
    }

    pub async fn fetch_details(&self, name: &str) -> Result<Animal, ApiError> {
        let request = self.build_fetch_details(name)?;
        let outcome = self.round_trip(request).await;
        self.parse_fetch_details(outcome)
            .inspect_err(|e| tracing::warn!(animal = name, error = %e, "fetching animal details failed"))
    }

    pub async fn fetch_image(&self, url_text: &str) -> Result<AnimalImage, ApiError> {
        let request = self
            .build_fetch_image(url_text)
            .inspect_err(|e| tracing::warn!(error = %e, "rejected image URL"))?;
        let outcome = self.round_trip(request).await;
        self.parse_fetch_image(outcome)
            .inspect_err(|e| tracing::warn!(url = url_text, error = %e, "fetching image failed"))
    }

    async fn round_trip(&self, request: HttpRequest) -> Exchange {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        self.transport.execute(request).await
    }
}

/// Unauthenticated endpoints: any transport error or non-200 status fails.
fn expect_ok(outcome: Exchange) -> Result<HttpResponse, ApiError> {
    let response = outcome.map_err(|e| ApiError::RequestFailed(e.to_string()))?;
    if response.status != OK {
        return Err(ApiError::RequestFailed(format!("unexpected status {}", response.status)));
    }
    Ok(response)
}

/// Authenticated endpoints: 401 wins over a transport error reported for the
/// same round trip.
fn authorized_body(outcome: Exchange) -> Result<Vec<u8>, ApiError> {
    let response = match outcome {
        Ok(response) => response,
        Err(e) if e.status == Some(UNAUTHORIZED) => return Err(ApiError::Unauthorized),
        Err(e) => return Err(ApiError::RequestFailed(e.to_string())),
    };
    if response.status == UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if response.status != OK {
        return Err(ApiError::RequestFailed(format!("unexpected status {}", response.status)));
    }
    non_empty(response)
}

fn non_empty(response: HttpResponse) -> Result<Vec<u8>, ApiError> {
    if response.body.is_empty() {
        return Err(ApiError::NoData);
    }
    Ok(response.body)
}

fn decode<D: DeserializeOwned>(body: &[u8]) -> Result<D, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::DecodeFailed(e.to_string()))
}
