//! In-memory roster of events for the signed-in user.
//!
//! The roster keeps server order for display and an id → position index for
//! lookups. Every mutation bumps `version` and records what changed, which
//! the layout engine uses to decide how much to re-place.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::event::{Event, EventId};

/// The most recent mutation applied to a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RosterChange {
    /// Nothing installed yet.
    #[default]
    Created,
    /// The whole list was superseded.
    Replaced,
    /// One record's membership flag was set.
    Patched(EventId),
}

#[derive(Debug, Default)]
pub struct RosterStore {
    events: Vec<Event>,
    positions: HashMap<EventId, usize>,
    version: u64,
    last_change: RosterChange,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the current roster and install `events` in the given order.
    ///
    /// Ids must be unique; if the server sends a duplicate, the first
    /// occurrence wins and later ones are dropped.
    pub fn replace(&mut self, events: Vec<Event>) {
        let mut positions = HashMap::with_capacity(events.len());
        let mut kept = Vec::with_capacity(events.len());

        for event in events {
            match positions.entry(event.id) {
                Entry::Occupied(_) => {
                    tracing::warn!(event_id = %event.id, "dropping duplicate event id from roster");
                }
                Entry::Vacant(slot) => {
                    slot.insert(kept.len());
                    kept.push(event);
                }
            }
        }

        self.events = kept;
        self.positions = positions;
        self.bump(RosterChange::Replaced);
    }

    /// Set the membership flag of the record with this id.
    ///
    /// The record is resolved by identity at call time. An unknown id leaves
    /// the roster untouched and returns `false`; callers only patch ids the
    /// server just confirmed, so this indicates a logic error rather than a
    /// user-facing condition.
    pub fn patch(&mut self, id: EventId, is_member: bool) -> bool {
        let Some(&position) = self.positions.get(&id) else {
            tracing::warn!(event_id = %id, "patch for an event that is not in the roster");
            return false;
        };

        self.events[position].is_member = is_member;
        self.bump(RosterChange::Patched(id));
        true
    }

    /// Ordered read view for rendering.
    pub fn all(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.positions.get(&id).map(|&position| &self.events[position])
    }

    pub fn position(&self, id: EventId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Incremented on every replace and every successful patch.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn last_change(&self) -> RosterChange {
        self.last_change
    }

    fn bump(&mut self, change: RosterChange) {
        self.version += 1;
        self.last_change = change;
    }
}
