//! HTTP implementation of the roster backend.

use reqwest::RequestBuilder;
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::error::{EventosError, EventosResult};
use crate::event::{Event, EventId, UserId};
use crate::remote::protocol::{self, MembershipRequest};
use crate::remote::{Failure, RosterRemote};

/// HTTP client for the events backend
pub struct HttpRemote {
    http: reqwest::Client,
    base_url: Url,
    fallback_message: String,
}

impl HttpRemote {
    pub fn new(base_url: &str) -> EventosResult<Self> {
        Self::from_config(&Config {
            api_url: base_url.to_string(),
            ..Config::default()
        })
    }

    pub fn from_config(config: &Config) -> EventosResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| EventosError::HttpClient(e.to_string()))?;

        Ok(HttpRemote {
            http,
            base_url: parse_base_url(&config.api_url)?,
            fallback_message: config.fallback_message.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, Failure> {
        self.base_url.join(path).map_err(|e| {
            tracing::warn!(path, error = %e, "could not build endpoint URL");
            Failure::transport(&self.fallback_message)
        })
    }

    /// Send one request and apply the `message` discriminant to its body.
    async fn exchange(&self, path: &str, request: RequestBuilder) -> Result<Option<Value>, Failure> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(path, error = %e, "request did not complete");
            Failure::transport(&self.fallback_message)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(path, %status, error = %e, "failed to read response body");
            Failure::transport(&self.fallback_message)
        })?;

        tracing::debug!(path, %status, bytes = body.len(), "response received");

        protocol::classify(status, &body, &self.fallback_message).inspect_err(|failure| {
            tracing::warn!(path, %status, kind = %failure.kind, message = %failure.message, "request rejected");
        })
    }

    async fn post_membership(&self, path: &str, event: EventId, user: UserId) -> Result<(), Failure> {
        let url = self.endpoint(path)?;
        let body = MembershipRequest {
            event_id: event,
            user_id: user,
        };

        self.exchange(path, self.http.post(url).json(&body)).await?;
        Ok(())
    }
}

impl RosterRemote for HttpRemote {
    /// GET /roster?user=<id>
    async fn fetch_roster(&self, user: UserId) -> Result<Vec<Event>, Failure> {
        let url = self.endpoint(protocol::ROSTER_PATH)?;
        let request = self.http.get(url).query(&[("user", user.0)]);

        let payload = self.exchange(protocol::ROSTER_PATH, request).await?;
        protocol::decode_roster(payload, &self.fallback_message)
    }

    /// POST /enter-event
    async fn join(&self, event: EventId, user: UserId) -> Result<(), Failure> {
        self.post_membership(protocol::ENTER_EVENT_PATH, event, user).await
    }

    /// POST /exit-event
    async fn leave(&self, event: EventId, user: UserId) -> Result<(), Failure> {
        self.post_membership(protocol::EXIT_EVENT_PATH, event, user).await
    }
}

/// Parse the configured base URL so that endpoint paths are appended to it
/// rather than replacing its last segment.
fn parse_base_url(raw: &str) -> EventosResult<Url> {
    let invalid = |reason: String| EventosError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("expected an http(s) URL".into()));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
