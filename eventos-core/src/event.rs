//! Event records as the roster view sees them.
//!
//! The backend returns one record per event visible to a user, already
//! annotated with that user's membership flag. Everything except
//! `is_member` is read-only from the client's point of view.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable identity of an event within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

/// Id of the signed-in user. Always passed explicitly, never read from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Opaque reference to a place owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub i64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One schedulable event visible to the current user.
///
/// Field aliases accept the legacy backend names (`id_event`, `is_in_event`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(alias = "id_event")]
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "date", with = "occurs_at_format")]
    pub occurs_at: NaiveDateTime,
    #[serde(alias = "id_place")]
    pub place_id: PlaceId,
    #[serde(alias = "is_in_event", default)]
    pub is_member: bool,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.title, self.id)
    }
}

/// Wire format for `occursAt`.
///
/// Event creation submits `date` and `hour` joined as `YYYY-MM-DDTHH:MM`, so
/// the seconds are frequently missing. Timestamps carrying an offset keep
/// their local wall time.
mod occurs_at_format {
    use super::*;

    const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
    const INPUT_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(OUTPUT_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid event date/time: {raw}")))
    }

    pub(super) fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }

        INPUT_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }
}
