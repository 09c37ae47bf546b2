//! Join/leave orchestration with confirm-then-apply semantics.
//!
//! The roster only ever reflects what the server confirmed: a toggle calls
//! the remote first and patches the roster once the call succeeded. A failed
//! call leaves the roster exactly as it was.
//!
//! The controller holds a weak handle to the roster. When the view that owns
//! the roster is torn down while a call is in flight, the eventual result is
//! dropped without touching anything.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::event::{EventId, UserId};
use crate::remote::{Failure, RosterRemote};
use crate::roster::RosterStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Join,
    Leave,
}

impl Action {
    /// The action a card offers for its current membership flag.
    pub fn for_membership(is_member: bool) -> Self {
        if is_member { Action::Leave } else { Action::Join }
    }

    /// Membership flag once the server confirms this action.
    pub fn confirmed_membership(self) -> bool {
        matches!(self, Action::Join)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Join => write!(f, "join"),
            Action::Leave => write!(f, "leave"),
        }
    }
}

pub struct MembershipController<R> {
    remote: R,
    roster: Weak<RefCell<RosterStore>>,
}

impl<R: RosterRemote> MembershipController<R> {
    pub fn new(remote: R, roster: &Rc<RefCell<RosterStore>>) -> Self {
        MembershipController {
            remote,
            roster: Rc::downgrade(roster),
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Fetch the user's roster and install it, superseding whatever was there.
    ///
    /// Returns the number of events installed.
    pub async fn refresh(&self, user: UserId) -> Result<usize, Failure> {
        let events = self.remote.fetch_roster(user).await?;

        let Some(roster) = self.roster.upgrade() else {
            tracing::debug!(%user, "roster dropped before fetch resolved, discarding result");
            return Ok(0);
        };

        let count = events.len();
        roster.borrow_mut().replace(events);
        tracing::debug!(%user, count, "roster replaced");
        Ok(count)
    }

    /// Ask the server to apply `action` and, once it confirms, patch the roster.
    ///
    /// No local idempotence check is made: joining an event the user already
    /// belongs to is left to the server to reject. On failure the `Failure`
    /// is returned unchanged.
    pub async fn toggle(&self, event: EventId, user: UserId, action: Action) -> Result<(), Failure> {
        let outcome = match action {
            Action::Join => self.remote.join(event, user).await,
            Action::Leave => self.remote.leave(event, user).await,
        };

        if let Err(failure) = outcome {
            tracing::debug!(%event, %user, %action, kind = %failure.kind, "toggle not confirmed");
            return Err(failure);
        }

        // Resolve the roster now, not before the call: other toggles or a
        // refresh may have changed it in the meantime.
        let Some(roster) = self.roster.upgrade() else {
            tracing::debug!(%event, %action, "roster dropped before toggle resolved, discarding result");
            return Ok(());
        };

        roster.borrow_mut().patch(event, action.confirmed_membership());
        tracing::debug!(%event, %user, %action, "membership confirmed");
        Ok(())
    }
}
