//! Last-writer-wins reconciliation.
//!
//! The log is append-only, duplicate-prone, and arrives in whatever
//! order the store returns it. [`reconcile`] reduces a sequence of
//! [`EventRecord`]s to the single current record per [`EntityKey`]:
//! the one with the latest timestamp, ties broken by arrival order
//! (the later arrival wins).
//!
//! The reduction is a pure, repeatable projection; no persisted
//! "current state" row exists anywhere. Re-running it over the same
//! fetched sequence always produces the same map, which is what makes
//! repeated, partial, and overlapping reads of the log safe: feeding
//! the same event twice is harmless because both copies agree.
//!
//! Keys with no event at all simply do not appear in the output; the
//! classifier treats absence as implicit PENDING, never as an error.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::NaiveDate;

use crate::event::{EntityKey, EventRecord};

/// Reduce an event sequence to the winning record per entity key.
///
/// Single pass, O(n) in the number of events. A record replaces the
/// held one when its timestamp is greater *or equal*: equality keeps
/// the later arrival, so exact-timestamp collisions resolve
/// deterministically for a fixed input sequence instead of crashing.
#[must_use]
pub fn reconcile<I>(events: I) -> HashMap<EntityKey, EventRecord>
where
    I: IntoIterator<Item = EventRecord>,
{
    let mut latest: HashMap<EntityKey, EventRecord> = HashMap::new();
    for event in events {
        match latest.entry(event.key()) {
            Entry::Vacant(slot) => {
                slot.insert(event);
            }
            Entry::Occupied(mut slot) => {
                if event.timestamp >= slot.get().timestamp {
                    slot.insert(event);
                }
            }
        }
    }
    latest
}

/// Reconcile only the events that apply to `day`.
///
/// Each day is an independent reduction: an event for day D never
/// affects day D±1, even when its timestamp falls on a different
/// calendar date (late and backfilled entries). Filtering happens
/// *before* the reduction, so a flood of events for other days cannot
/// shadow this day's records.
#[must_use]
pub fn reconcile_for_day<I>(events: I, day: NaiveDate) -> HashMap<EntityKey, EventRecord>
where
    I: IntoIterator<Item = EventRecord>,
{
    reconcile(events.into_iter().filter(|event| event.day == day))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::RawStatus;
    use chrono::{DateTime, FixedOffset, TimeZone};

    fn ts(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 1, h, m, s)
            .unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn event(item_id: &str, d: u32, timestamp: DateTime<FixedOffset>, status: RawStatus) -> EventRecord {
        EventRecord {
            timestamp,
            day: day(d),
            area_id: "CALDEIRA".into(),
            shift: "Manha".into(),
            item_id: item_id.into(),
            item_text: String::new(),
            raw_status: status,
            actor_login: "op1".into(),
            actor_name: "Operator One".into(),
            note: None,
        }
    }

    // === Last writer wins ===

    #[test]
    fn later_timestamp_wins() {
        let latest = reconcile(vec![
            event("CB-01", 1, ts(10, 0, 0), RawStatus::Ok),
            event("CB-01", 1, ts(10, 0, 5), RawStatus::NotOk),
        ]);
        assert_eq!(latest.len(), 1);
        let winner = latest.values().next().unwrap();
        assert_eq!(winner.raw_status, RawStatus::NotOk);
    }

    #[test]
    fn later_timestamp_wins_regardless_of_arrival_order() {
        // NOT_OK at 10:00:05 arrives first, but still wins on timestamp.
        let latest = reconcile(vec![
            event("CB-01", 1, ts(10, 0, 5), RawStatus::NotOk),
            event("CB-01", 1, ts(10, 0, 0), RawStatus::Ok),
        ]);
        let winner = latest.values().next().unwrap();
        assert_eq!(winner.raw_status, RawStatus::NotOk);
    }

    #[test]
    fn earlier_event_never_displaces_later() {
        let newer = event("CB-01", 1, ts(12, 0, 0), RawStatus::Ok);
        let older = event("CB-01", 1, ts(9, 0, 0), RawStatus::NotOk);
        let latest = reconcile(vec![newer.clone(), older]);
        assert_eq!(latest.values().next().unwrap(), &newer);
    }

    #[test]
    fn exact_tie_keeps_later_arrival() {
        let latest = reconcile(vec![
            event("CB-01", 1, ts(10, 0, 0), RawStatus::Ok),
            event("CB-01", 1, ts(10, 0, 0), RawStatus::NotOk),
        ]);
        assert_eq!(latest.values().next().unwrap().raw_status, RawStatus::NotOk);
    }

    // === Key independence ===

    #[test]
    fn distinct_items_do_not_interfere() {
        let latest = reconcile(vec![
            event("CB-01", 1, ts(10, 0, 0), RawStatus::Ok),
            event("CB-02", 1, ts(11, 0, 0), RawStatus::NotOk),
        ]);
        assert_eq!(latest.len(), 2);
    }

    #[test]
    fn same_item_different_shifts_are_distinct_keys() {
        let mut night = event("CB-01", 1, ts(22, 0, 0), RawStatus::NotOk);
        night.shift = "Noite".into();
        let latest = reconcile(vec![
            event("CB-01", 1, ts(10, 0, 0), RawStatus::Ok),
            night,
        ]);
        assert_eq!(latest.len(), 2);
    }

    #[test]
    fn duplicate_replay_is_idempotent() {
        let events = vec![
            event("CB-01", 1, ts(10, 0, 0), RawStatus::Ok),
            event("CB-02", 1, ts(11, 0, 0), RawStatus::NotOk),
        ];
        let once = reconcile(events.clone());
        let doubled = reconcile(events.iter().cloned().chain(events.clone()));
        assert_eq!(once, doubled);
    }

    #[test]
    fn empty_input_yields_empty_map() {
        assert!(reconcile(Vec::new()).is_empty());
    }

    // === Per-day views ===

    #[test]
    fn day_filter_excludes_other_days() {
        let latest = reconcile_for_day(
            vec![
                event("CB-01", 1, ts(10, 0, 0), RawStatus::Ok),
                event("CB-01", 2, ts(10, 0, 0), RawStatus::NotOk),
            ],
            day(1),
        );
        assert_eq!(latest.len(), 1);
        assert_eq!(latest.values().next().unwrap().raw_status, RawStatus::Ok);
    }

    #[test]
    fn late_entry_lands_on_its_day() {
        // Written on May 2nd, applies to May 1st.
        let mut late = event("CB-01", 1, ts(10, 0, 0), RawStatus::Ok);
        late.timestamp = FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 2, 8, 30, 0)
            .unwrap();

        let for_first = reconcile_for_day(vec![late.clone()], day(1));
        assert_eq!(for_first.len(), 1);

        let for_second = reconcile_for_day(vec![late], day(2));
        assert!(for_second.is_empty());
    }

    #[test]
    fn unmark_event_wins_like_any_other() {
        // PENDING is a first-class status: a later unmark reverts an OK.
        let latest = reconcile(vec![
            event("CB-01", 1, ts(10, 0, 0), RawStatus::Ok),
            event("CB-01", 1, ts(10, 5, 0), RawStatus::Pending),
        ]);
        assert_eq!(latest.values().next().unwrap().raw_status, RawStatus::Pending);
    }
}
