//! # History Chain
//!
//! Reconstructs an identity's change history from its latest position by
//! following `previous_change` links back to `0`.
//!
//! When a ledger puts several events for one identity at the same position,
//! only the earliest of them links to an older position; the later ones point
//! at the shared position itself. The walk follows the earliest event's link.

use super::entities::RegistryEvent;
use super::errors::HistoryError;
use crate::ports::outbound::HistorySource;
use idr_types::{Address, AttributeName, Position, Timestamp};
use std::collections::HashSet;

/// Walk backwards from `head`, returning events most-recent-first.
pub fn walk_history<H: HistorySource + ?Sized>(
    source: &H,
    identity: &Address,
    head: Position,
) -> Result<Vec<RegistryEvent>, HistoryError> {
    let mut history = Vec::new();
    let mut position = head;

    while position != 0 {
        let events = source.events_at(position, identity)?;
        let previous = match events.first() {
            Some(earliest) => earliest.previous_change(),
            None => return Err(HistoryError::MissingEvents { position }),
        };
        if previous >= position {
            return Err(HistoryError::BrokenLink { position, previous });
        }

        history.extend(events.into_iter().rev());
        position = previous;
    }

    Ok(history)
}

/// An attribute whose latest event has not yet expired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveAttribute {
    pub name: AttributeName,
    pub value: Vec<u8>,
    pub valid_to: Timestamp,
}

/// Fold most-recent-first history into the attributes valid at `now`.
///
/// Name and value together form the key, so revoking `(name, "a")` leaves
/// `(name, "b")` untouched. The latest event per key wins; it is active iff
/// `valid_to > now`, which also drops the `0` tombstone.
pub fn active_attributes<'a, I>(events: I, now: Timestamp) -> Vec<ActiveAttribute>
where
    I: IntoIterator<Item = &'a RegistryEvent>,
{
    let mut seen: HashSet<(AttributeName, &'a [u8])> = HashSet::new();
    let mut active = Vec::new();

    for event in events {
        if let RegistryEvent::AttributeChanged {
            name,
            value,
            valid_to,
            ..
        } = event
        {
            if !seen.insert((*name, value.as_slice())) {
                continue;
            }
            if *valid_to > now {
                active.push(ActiveAttribute {
                    name: *name,
                    value: value.clone(),
                    valid_to: *valid_to,
                });
            }
        }
    }

    active
}
