//! Wire shapes for the roster endpoints and the response discriminant.
//!
//! The backend signals failure by including a `message` field in the body,
//! whatever the HTTP status. Everything else is a success whose remaining
//! body is the payload. That contract is kept as-is here; the only extra
//! information derived from the status code is the `FailureKind` tag.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::{Event, EventId, UserId};
use crate::remote::{Failure, FailureKind};

pub const ROSTER_PATH: &str = "roster";
pub const ENTER_EVENT_PATH: &str = "enter-event";
pub const EXIT_EVENT_PATH: &str = "exit-event";

/// Body of `POST enter-event` and `POST exit-event`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    pub event_id: EventId,
    pub user_id: UserId,
}

/// Successful body of `GET roster`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterPayload {
    pub data: Vec<Event>,
}

/// Apply the `message` discriminant to a raw response.
///
/// Returns `Ok(None)` for an empty body, `Ok(Some(payload))` for any body
/// without a `message` field, and a `Failure` otherwise. A body that is not
/// JSON at all is a transport failure carrying `fallback_message`.
pub fn classify(status: StatusCode, body: &[u8], fallback_message: &str) -> Result<Option<Value>, Failure> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(%status, error = %e, "response body is not JSON");
        Failure::transport(fallback_message)
    })?;

    match value.get("message") {
        Some(message) => {
            let message = match message {
                Value::String(s) => s.clone(),
                Value::Null => fallback_message.to_string(),
                other => other.to_string(),
            };
            Err(Failure::new(kind_for_status(status), message))
        }
        None => Ok(Some(value)),
    }
}

/// Decode a successful `GET roster` payload.
pub fn decode_roster(payload: Option<Value>, fallback_message: &str) -> Result<Vec<Event>, Failure> {
    let Some(payload) = payload else {
        tracing::debug!("roster response had an empty body");
        return Err(Failure::transport(fallback_message));
    };

    serde_json::from_value::<RosterPayload>(payload)
        .map(|p| p.data)
        .map_err(|e| {
            tracing::debug!(error = %e, "roster payload did not match the expected shape");
            Failure::transport(fallback_message)
        })
}

/// A message-bearing body that came with a 5xx status means the server
/// itself broke; anything else was a deliberate rejection.
fn kind_for_status(status: StatusCode) -> FailureKind {
    if status.is_server_error() {
        FailureKind::Transport
    } else {
        FailureKind::Application
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FALLBACK: &str = "Estamos com problemas";

    #[test]
    fn test_message_means_failure_even_with_success_status() {
        let body = br#"{"message":"Usuario ja esta no evento"}"#;
        let failure = classify(StatusCode::OK, body, FALLBACK).unwrap_err();

        assert_eq!(failure.kind, FailureKind::Application);
        assert_eq!(failure.message, "Usuario ja esta no evento");
    }

    #[test]
    fn test_message_with_server_error_is_transport_kind() {
        let body = br#"{"message":"Estamos com problemas"}"#;
        let failure = classify(StatusCode::INTERNAL_SERVER_ERROR, body, FALLBACK).unwrap_err();

        assert_eq!(failure.kind, FailureKind::Transport);
        assert_eq!(failure.message, "Estamos com problemas");
    }

    #[test]
    fn test_absent_message_is_success_regardless_of_status() {
        let payload = classify(StatusCode::BAD_REQUEST, br#"{"data":[]}"#, FALLBACK).unwrap();
        assert_eq!(payload, Some(json!({ "data": [] })));
    }

    #[test]
    fn test_empty_body_is_success_without_payload() {
        assert_eq!(classify(StatusCode::OK, b"", FALLBACK).unwrap(), None);
        assert_eq!(classify(StatusCode::NO_CONTENT, b"  \n", FALLBACK).unwrap(), None);
    }

    #[test]
    fn test_garbage_body_uses_fallback_message() {
        let failure = classify(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>", FALLBACK).unwrap_err();

        assert_eq!(failure.kind, FailureKind::Transport);
        assert_eq!(failure.message, FALLBACK);
    }

    #[test]
    fn test_non_string_message_is_stringified() {
        let failure = classify(StatusCode::OK, br#"{"message":42}"#, FALLBACK).unwrap_err();
        assert_eq!(failure.message, "42");
    }

    #[test]
    fn test_decode_roster_requires_data() {
        let failure = decode_roster(Some(json!({ "events": [] })), FALLBACK).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Transport);

        let failure = decode_roster(None, FALLBACK).unwrap_err();
        assert_eq!(failure.message, FALLBACK);
    }

    #[test]
    fn test_decode_roster_preserves_server_order() {
        let payload = json!({
            "data": [
                { "id": 9, "title": "b", "description": "", "occursAt": "2024-01-01T10:00", "placeId": 1, "isMember": false },
                { "id": 3, "title": "a", "description": "", "occursAt": "2024-01-01T09:00", "placeId": 1, "isMember": true }
            ]
        });

        let events = decode_roster(Some(payload), FALLBACK).unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![9, 3]);
    }

    #[test]
    fn test_membership_request_is_camel_case() {
        let body = serde_json::to_value(MembershipRequest {
            event_id: EventId(1),
            user_id: UserId(5),
        })
        .unwrap();

        assert_eq!(body, json!({ "eventId": 1, "userId": 5 }));
    }
}
