//! Overlay cache: read-your-writes over a slow, rate-limited store.
//!
//! The external store has propagation delay, and callers throttle
//! re-fetches to respect rate limits, so an event a session just wrote
//! may not appear in the next fetch. The [`OverlayCache`] buffers the
//! session's own writes and merges them into whatever the log reader
//! last returned, letting the caller see its writes immediately.
//!
//! The buffer is never the source of truth. Correctness of [`merge`]
//! relies only on the reconciler's last-writer-wins semantics: the
//! external copy of a buffered event and the buffered copy agree, so no
//! deduplication is needed. Discarding the buffer (restart) at worst
//! makes the view momentarily stale until the store catches up.
//!
//! [`merge`]: OverlayCache::merge

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::event::{EntityKey, EventRecord};

/// Session-local buffer of events written but not yet confirmed visible
/// in a fetch.
///
/// `record`/`merge` may be called from multiple threads of one session;
/// access is serialized by an internal mutex. Buffers of different
/// sessions are independent; no cross-session locking exists.
#[derive(Debug, Default)]
pub struct OverlayCache {
    buffered: Mutex<Vec<EventRecord>>,
}

impl OverlayCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer an event this session just appended to the store.
    ///
    /// Recording the same logical event twice is harmless: both copies
    /// agree, and reconciliation is last-writer-wins.
    pub fn record(&self, event: EventRecord) {
        self.lock().push(event);
    }

    /// Combine a fetched sequence with the buffered writes.
    ///
    /// Buffered events are appended *after* the external ones, so on an
    /// exact timestamp tie the session's own copy wins by arrival order.
    #[must_use]
    pub fn merge(&self, external: Vec<EventRecord>) -> Vec<EventRecord> {
        let buffered = self.lock();
        let mut combined = external;
        combined.extend(buffered.iter().cloned());
        combined
    }

    /// Drop buffered entries the store has confirmed.
    ///
    /// An entry is confirmed once the fetched sequence contains an event
    /// for the same entity key with an equal-or-later timestamp; from
    /// then on the external log alone reproduces the entry's effect.
    pub fn retire_confirmed(&self, external: &[EventRecord]) {
        let mut newest: HashMap<EntityKey, chrono::DateTime<chrono::FixedOffset>> = HashMap::new();
        for event in external {
            newest
                .entry(event.key())
                .and_modify(|ts| {
                    if event.timestamp > *ts {
                        *ts = event.timestamp;
                    }
                })
                .or_insert(event.timestamp);
        }

        let mut buffered = self.lock();
        let before = buffered.len();
        buffered.retain(|event| {
            newest
                .get(&event.key())
                .is_none_or(|confirmed| event.timestamp > *confirmed)
        });
        let retired = before - buffered.len();
        if retired > 0 {
            debug!(retired, remaining = buffered.len(), "retired confirmed overlay entries");
        }
    }

    /// Number of buffered, unconfirmed events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop everything. Safe: durable state is reconstructible from the
    /// external log alone.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<EventRecord>> {
        // A panicking writer cannot corrupt a Vec of owned records;
        // absorb poisoning instead of propagating it.
        self.buffered.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
