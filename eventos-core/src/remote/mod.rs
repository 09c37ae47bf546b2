//! Remote operations the roster view depends on.
//!
//! Three single request/response exchanges: list the roster, join an event,
//! leave an event. None of them retries. Expected failures come back as
//! `Failure` values; nothing here panics on a bad response.

pub mod client;
pub mod protocol;

use std::fmt;

use thiserror::Error;

use crate::event::{Event, EventId, UserId};

pub use client::HttpRemote;

/// Where a failure came from.
///
/// Callers currently treat both kinds the same way (show the message), the
/// tag only exists so that future callers can react differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The exchange did not complete, or the server broke while handling it.
    Transport,
    /// The server handled the request and rejected it.
    Application,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport"),
            FailureKind::Application => write!(f, "application"),
        }
    }
}

/// A failed remote operation, with a message meant for the end user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transport, message)
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Application, message)
    }
}

/// The roster backend.
///
/// Implemented over HTTP by [`HttpRemote`]; tests provide in-memory fakes.
/// Futures are not required to be `Send`: everything runs on one thread.
#[allow(async_fn_in_trait)]
pub trait RosterRemote {
    /// All events visible to `user`, in server order, each carrying that
    /// user's membership flag.
    async fn fetch_roster(&self, user: UserId) -> Result<Vec<Event>, Failure>;

    /// Request enrollment of `user` in `event`.
    async fn join(&self, event: EventId, user: UserId) -> Result<(), Failure>;

    /// Request withdrawal of `user` from `event`.
    async fn leave(&self, event: EventId, user: UserId) -> Result<(), Failure>;
}

impl<T: RosterRemote> RosterRemote for &T {
    async fn fetch_roster(&self, user: UserId) -> Result<Vec<Event>, Failure> {
        (**self).fetch_roster(user).await
    }

    async fn join(&self, event: EventId, user: UserId) -> Result<(), Failure> {
        (**self).join(event, user).await
    }

    async fn leave(&self, event: EventId, user: UserId) -> Result<(), Failure> {
        (**self).leave(event, user).await
    }
}
