//! # In-Memory Ledger
//!
//! Ledger and history source for tests and embedding.
//!
//! - Positions start at 1.
//! - **Automine** (default): every append lands in its own position.
//! - **Batch**: appends share the pending position until [`InMemoryLedger::mine`].
//! - The clock only moves when told to.

use crate::domain::entities::RegistryEvent;
use crate::domain::errors::LedgerError;
use crate::ports::outbound::{HistorySource, Ledger};
use idr_types::{Address, Position, Timestamp};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MiningMode {
    #[default]
    Automine,
    Batch,
}

#[derive(Debug, Default)]
struct LedgerInner {
    /// Last sealed position; the pending one is `head + 1`.
    head: Position,
    time: Timestamp,
    mode: MiningMode,
    events: BTreeMap<Position, Vec<RegistryEvent>>,
    /// (position, identity) -> offsets into `events[position]`
    index: HashMap<(Position, Address), Vec<usize>>,
    rejecting: Option<String>,
}

/// In-memory append-only ledger.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    inner: RwLock<LedgerInner>,
}

impl InMemoryLedger {
    /// Automine ledger with the clock at `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Automine ledger with the clock at `time`.
    #[must_use]
    pub fn starting_at(time: Timestamp) -> Self {
        let ledger = Self::new();
        ledger.set_time(time);
        ledger
    }

    pub fn set_mode(&self, mode: MiningMode) {
        self.inner.write().mode = mode;
    }

    pub fn mode(&self) -> MiningMode {
        self.inner.read().mode
    }

    /// Seal the pending position and return it.
    pub fn mine(&self) -> Position {
        let mut inner = self.inner.write();
        inner.head += 1;
        inner.head
    }

    /// Last sealed position.
    pub fn head(&self) -> Position {
        self.inner.read().head
    }

    pub fn set_time(&self, time: Timestamp) {
        self.inner.write().time = time;
    }

    pub fn advance_time(&self, seconds: u64) {
        let mut inner = self.inner.write();
        inner.time = inner.time.saturating_add(seconds);
    }

    /// Make every following append fail with [`LedgerError::Rejected`].
    pub fn reject_appends(&self, reason: impl Into<String>) {
        self.inner.write().rejecting = Some(reason.into());
    }

    pub fn accept_appends(&self) {
        self.inner.write().rejecting = None;
    }

    /// Every event in ledger order.
    pub fn events(&self) -> Vec<(Position, RegistryEvent)> {
        self.inner
            .read()
            .events
            .iter()
            .flat_map(|(position, events)| events.iter().map(move |e| (*position, e.clone())))
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.inner.read().events.values().map(Vec::len).sum()
    }
}

impl Ledger for InMemoryLedger {
    fn next_position(&self) -> Position {
        self.inner.read().head + 1
    }

    fn current_time(&self) -> Timestamp {
        self.inner.read().time
    }

    fn append(&self, event: RegistryEvent) -> Result<(), LedgerError> {
        let mut inner = self.inner.write();
        if let Some(reason) = &inner.rejecting {
            return Err(LedgerError::Rejected {
                reason: reason.clone(),
            });
        }

        let position = inner.head + 1;
        let identity = event.identity();
        let slot = inner.events.entry(position).or_default();
        slot.push(event);
        let offset = slot.len() - 1;
        inner.index.entry((position, identity)).or_default().push(offset);

        if inner.mode == MiningMode::Automine {
            inner.head = position;
        }
        Ok(())
    }
}

impl HistorySource for InMemoryLedger {
    fn events_at(
        &self,
        position: Position,
        identity: &Address,
    ) -> Result<Vec<RegistryEvent>, LedgerError> {
        let inner = self.inner.read();
        let (Some(offsets), Some(events)) = (
            inner.index.get(&(position, *identity)),
            inner.events.get(&position),
        ) else {
            return Ok(Vec::new());
        };
        Ok(offsets
            .iter()
            .filter_map(|&i| events.get(i).cloned())
            .collect())
    }
}
