//! Property tests for the last-writer-wins reconciler and the
//! classifier's aggregation invariants.

use chrono::Duration;
use proptest::prelude::*;

use rota_core::reconcile::reconcile;
use rota_core::status::RawStatus;

use generators::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(1000))]

    // === Order independence ===

    #[test]
    fn reconcile_ignores_arrival_order_without_ties(
        (original, shuffled) in arb_events_unique_ts(32)
            .prop_flat_map(|events| (Just(events.clone()), Just(events).prop_shuffle()))
    ) {
        prop_assert_eq!(reconcile(original), reconcile(shuffled));
    }

    #[test]
    fn reconcile_is_idempotent_under_replay(events in arb_events_unique_ts(32)) {
        let once = reconcile(events.clone());
        let doubled = reconcile(events.iter().cloned().chain(events.clone()));
        prop_assert_eq!(once, doubled);
    }

    // === Monotonic overwrite ===

    #[test]
    fn later_append_always_wins(events in arb_events_unique_ts(32), status in arb_status()) {
        prop_assume!(!events.is_empty());
        let mut newer = events[0].clone();
        newer.timestamp = events
            .iter()
            .map(|e| e.timestamp)
            .max()
            .expect("non-empty")
            + Duration::seconds(1);
        newer.raw_status = status;

        let mut appended = events.clone();
        appended.push(newer.clone());
        let latest = reconcile(appended);
        prop_assert_eq!(latest.get(&newer.key()), Some(&newer));
    }

    #[test]
    fn earlier_append_never_changes_winner(events in arb_events_unique_ts(32)) {
        prop_assume!(!events.is_empty());
        let mut stale = events[0].clone();
        stale.timestamp = events
            .iter()
            .map(|e| e.timestamp)
            .min()
            .expect("non-empty")
            - Duration::seconds(1);
        stale.raw_status = RawStatus::NotOk;

        let without = reconcile(events.clone());
        let mut appended = events;
        appended.push(stale);
        prop_assert_eq!(without, reconcile(appended));
    }

    // === Output shape ===

    #[test]
    fn every_winner_keys_to_its_slot(events in proptest::collection::vec(arb_event(), 0..48)) {
        let latest = reconcile(events);
        for (key, event) in &latest {
            prop_assert_eq!(key, &event.key());
        }
    }

    #[test]
    fn winner_count_never_exceeds_input(events in proptest::collection::vec(arb_event(), 0..48)) {
        let count = events.len();
        prop_assert!(reconcile(events).len() <= count);
    }
}

// ---------------------------------------------------------------------------
// Aggregation invariants
// ---------------------------------------------------------------------------

mod aggregation {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use rota_core::catalog::{CatalogItem, ResponseKind};
    use rota_core::classify::summarize;
    use rota_core::deadline::Deadline;
    use rota_core::reconcile::reconcile_for_day;

    fn catalog() -> Vec<CatalogItem> {
        let mut items = Vec::new();
        for (area, shift) in [("CALDEIRA", "Manha"), ("CALDEIRA", "Noite"), ("DOCA", "Manha")] {
            for (index, id) in ["CB-01", "CB-02", "CB-03", "CB-04"].iter().enumerate() {
                items.push(CatalogItem {
                    item_id: (*id).to_owned(),
                    area_id: area.to_owned(),
                    shift: shift.to_owned(),
                    text: String::new(),
                    response: ResponseKind::Check,
                    critical: false,
                    minimum: None,
                    deadline: Deadline::parse("09:00"),
                    tolerance_minutes: 15,
                    active: true,
                    display_order: u32::try_from(index).expect("small index"),
                });
            }
        }
        items
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(500))]

        #[test]
        fn counts_partition_catalog(events in proptest::collection::vec(arb_event(), 0..64)) {
            let items = catalog();
            let day = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");
            let now = store_offset()
                .with_ymd_and_hms(2024, 5, 1, 14, 0, 0)
                .single()
                .expect("valid instant");

            let latest = reconcile_for_day(events, day);
            let summaries = summarize(&items, &latest, day, now);

            let grand_total: usize = summaries.iter().map(|s| s.total).sum();
            prop_assert_eq!(grand_total, items.len());
            for summary in &summaries {
                prop_assert_eq!(
                    summary.ok + summary.not_ok + summary.pending + summary.overdue,
                    summary.total
                );
                let completion = summary.completion();
                prop_assert!((0.0..=1.0).contains(&completion));
            }
        }
    }
}
