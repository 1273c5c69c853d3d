//! Production `Transport` backed by a `ureq` agent.
//!
//! The agent is blocking, so each round trip runs on the tokio blocking pool
//! and the calling task only awaits the join handle.

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{Exchange, HttpMethod, HttpRequest, HttpResponse, Transport};

#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Status codes are returned as data rather than `Err` so the client can
    /// tell a 401 apart from other failures.
    pub fn new(config: &ClientConfig) -> Self {
        let mut builder = ureq::Agent::config_builder().http_status_as_error(false);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout_global(Some(timeout));
        }
        Self {
            agent: builder.build().new_agent(),
        }
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Exchange {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
            .await
            .map_err(|e| TransportError::new(format!("transport task failed: {e}")))?
    }
}

fn execute_blocking(agent: &ureq::Agent, request: HttpRequest) -> Exchange {
    let result = match (request.method, request.body) {
        (HttpMethod::Get, _) => with_headers(agent.get(&request.url), &request.headers).call(),
        (HttpMethod::Post, Some(body)) => {
            with_headers(agent.post(&request.url), &request.headers).send(body.as_bytes())
        }
        (HttpMethod::Post, None) => with_headers(agent.post(&request.url), &request.headers).send_empty(),
    };
    let mut response = result.map_err(|e| TransportError::new(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_vec()
        .map_err(|e| TransportError::with_status(e.to_string(), status))?;

    Ok(HttpResponse { status, headers, body })
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
