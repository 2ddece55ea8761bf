//! Session layer: one user's connection to one checklist.
//!
//! A [`Checklist`] owns a log reader, a log writer, a catalog snapshot,
//! and an [`OverlayCache`]. The overlay sits between the write path and
//! the read path: a mark is appended to the store *and* buffered
//! locally, so the next [`refresh`] shows it even while the store is
//! still propagating or the fetch is throttled.
//!
//! `now` and `day` are explicit on every call; the session never reads
//! the host clock, which keeps refreshes reproducible and testable.
//!
//! [`refresh`]: Checklist::refresh

use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::debug;

use rota_core::catalog::CatalogItem;
use rota_core::classify::{DayView, day_view};
use rota_core::event::EventRecord;
use rota_core::overlay::OverlayCache;
use rota_core::reconcile::reconcile_for_day;
use rota_core::status::RawStatus;

use crate::api::{EventLogRead, EventLogWrite};
use crate::error::{ErrorCode, StoreError};

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// Who is performing checklist actions in this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub login: String,
    pub name: String,
}

impl Actor {
    #[must_use]
    pub fn new(login: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            name: name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Checklist session
// ---------------------------------------------------------------------------

/// One refresh's result: the classified day plus how many log rows were
/// unusable (surfaced so a shell can show a data-quality warning).
#[derive(Debug, Clone, PartialEq)]
pub struct DayRefresh {
    pub view: DayView,
    pub dropped_rows: usize,
}

/// A session over one checklist: catalog snapshot + log access +
/// overlay cache.
pub struct Checklist<R, W> {
    reader: R,
    writer: W,
    items: Vec<CatalogItem>,
    overlay: OverlayCache,
}

impl<R: EventLogRead, W: EventLogWrite> Checklist<R, W> {
    #[must_use]
    pub fn new(reader: R, writer: W, items: Vec<CatalogItem>) -> Self {
        Self {
            reader,
            writer,
            items,
            overlay: OverlayCache::new(),
        }
    }

    /// The catalog snapshot this session works against.
    #[must_use]
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Look up a catalog item by identity.
    #[must_use]
    pub fn item(&self, area_id: &str, shift: &str, item_id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| {
            item.area_id == area_id && item.shift == shift && item.item_id == item_id
        })
    }

    /// Fetch, merge the session's own unconfirmed writes, reconcile the
    /// requested day, and classify.
    ///
    /// Fetched events first retire confirmed overlay entries, then the
    /// remainder is merged in, so the view converges to the external
    /// log as it catches up, and never loses the session's writes while
    /// it hasn't.
    pub fn refresh(
        &self,
        day: NaiveDate,
        now: DateTime<FixedOffset>,
    ) -> Result<DayRefresh, StoreError> {
        let parsed = self.reader.fetch()?;
        self.overlay.retire_confirmed(&parsed.events);
        let combined = self.overlay.merge(parsed.events);
        let latest = reconcile_for_day(combined, day);
        debug!(
            day = %day,
            keys = latest.len(),
            buffered = self.overlay.len(),
            "refreshed day view"
        );
        Ok(DayRefresh {
            view: day_view(&self.items, &latest, day, now),
            dropped_rows: parsed.dropped,
        })
    }

    /// Record a status for an item: append to the store, then buffer in
    /// the overlay.
    ///
    /// Number/Text items require a non-empty note (the measured value);
    /// the call is rejected before any I/O otherwise. Returns the
    /// appended record.
    pub fn mark(
        &self,
        item: &CatalogItem,
        day: NaiveDate,
        status: RawStatus,
        actor: &Actor,
        note: Option<String>,
        now: DateTime<FixedOffset>,
    ) -> Result<EventRecord, StoreError> {
        let note = note.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty());
        if status.is_terminal() && item.response.requires_note() && note.is_none() {
            return Err(StoreError::new(
                ErrorCode::NoteRequired,
                format!("item {} expects a {} value", item.item_id, item.response),
            ));
        }

        let event = EventRecord {
            timestamp: now,
            day,
            area_id: item.area_id.clone(),
            shift: item.shift.clone(),
            item_id: item.item_id.clone(),
            item_text: item.text.clone(),
            raw_status: status,
            actor_login: actor.login.clone(),
            actor_name: actor.name.clone(),
            note,
        };
        self.writer.append(&event)?;
        self.overlay.record(event.clone());
        Ok(event)
    }

    /// Revert an item to pending. An unmark is a real, auditable event.
    pub fn unmark(
        &self,
        item: &CatalogItem,
        day: NaiveDate,
        actor: &Actor,
        now: DateTime<FixedOffset>,
    ) -> Result<EventRecord, StoreError> {
        self.mark(item, day, RawStatus::Pending, actor, None, now)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use rota_core::catalog::ResponseKind;
    use rota_core::deadline::Deadline;
    use rota_core::event::ParsedLog;
    use rota_core::status::EffectiveStatus;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex, PoisonError};

    /// Shared in-memory log standing in for the external store.
    #[derive(Default, Clone)]
    struct MemoryLog {
        events: Arc<Mutex<Vec<EventRecord>>>,
        /// Events appended but not yet "propagated" into fetches.
        lagging: Arc<Mutex<bool>>,
    }

    impl MemoryLog {
        fn events(&self) -> Vec<EventRecord> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        fn set_lagging(&self, lagging: bool) {
            *self.lagging.lock().unwrap_or_else(PoisonError::into_inner) = lagging;
        }

        fn seed(&self, event: EventRecord) {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event);
        }
    }

    impl EventLogRead for MemoryLog {
        fn fetch(&self) -> Result<ParsedLog, StoreError> {
            let lagging = *self.lagging.lock().unwrap_or_else(PoisonError::into_inner);
            let events = if lagging { Vec::new() } else { self.events() };
            Ok(ParsedLog { events, dropped: 0 })
        }
    }

    impl EventLogWrite for MemoryLog {
        fn append(&self, event: &EventRecord) -> Result<(), StoreError> {
            self.seed(event.clone());
            Ok(())
        }
    }

    fn sp(d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, d, h, mi, 0)
            .unwrap()
    }

    fn may(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn catalog() -> Vec<CatalogItem> {
        vec![
            CatalogItem {
                item_id: "CB-01".into(),
                area_id: "CALDEIRA".into(),
                shift: "Manha".into(),
                text: "Verificar pressao".into(),
                response: ResponseKind::Check,
                critical: false,
                minimum: None,
                deadline: Deadline::parse("09:00"),
                tolerance_minutes: 15,
                active: true,
                display_order: 1,
            },
            CatalogItem {
                item_id: "CB-02".into(),
                area_id: "CALDEIRA".into(),
                shift: "Manha".into(),
                text: "Medir temperatura".into(),
                response: ResponseKind::Number,
                critical: false,
                minimum: Some(60.0),
                deadline: None,
                tolerance_minutes: 0,
                active: true,
                display_order: 2,
            },
        ]
    }

    fn session(log: &MemoryLog) -> Checklist<MemoryLog, MemoryLog> {
        Checklist::new(log.clone(), log.clone(), catalog())
    }

    fn operator() -> Actor {
        Actor::new("mferreira", "Marcia Ferreira")
    }

    // === mark / refresh ===

    #[test]
    fn mark_appends_and_refresh_reflects_it() {
        let log = MemoryLog::default();
        let checklist = session(&log);
        let item = checklist.item("CALDEIRA", "Manha", "CB-01").unwrap().clone();

        checklist
            .mark(&item, may(1), RawStatus::Ok, &operator(), None, sp(1, 8, 30))
            .expect("mark succeeds");
        assert_eq!(log.events().len(), 1);

        let refreshed = checklist.refresh(may(1), sp(1, 9, 0)).expect("refresh");
        assert_eq!(refreshed.view.rows[0].effective, EffectiveStatus::Ok);
        assert_eq!(refreshed.dropped_rows, 0);
    }

    #[test]
    fn session_sees_write_while_store_lags() {
        let log = MemoryLog::default();
        let checklist = session(&log);
        let item = checklist.item("CALDEIRA", "Manha", "CB-01").unwrap().clone();

        log.set_lagging(true);
        checklist
            .mark(&item, may(1), RawStatus::Ok, &operator(), None, sp(1, 8, 30))
            .expect("mark succeeds");

        // Fetch returns nothing, but the overlay fills the gap.
        let refreshed = checklist.refresh(may(1), sp(1, 9, 0)).expect("refresh");
        assert_eq!(refreshed.view.rows[0].effective, EffectiveStatus::Ok);

        // Store catches up; the overlay entry retires on the next refresh.
        log.set_lagging(false);
        let refreshed = checklist.refresh(may(1), sp(1, 9, 5)).expect("refresh");
        assert_eq!(refreshed.view.rows[0].effective, EffectiveStatus::Ok);
    }

    #[test]
    fn unmark_reverts_and_deadline_applies_again() {
        let log = MemoryLog::default();
        let checklist = session(&log);
        let item = checklist.item("CALDEIRA", "Manha", "CB-01").unwrap().clone();

        checklist
            .mark(&item, may(1), RawStatus::Ok, &operator(), None, sp(1, 8, 30))
            .expect("mark");
        checklist
            .unmark(&item, may(1), &operator(), sp(1, 8, 45))
            .expect("unmark");

        // Before the deadline: pending. Past deadline + tolerance: overdue.
        let early = checklist.refresh(may(1), sp(1, 9, 0)).expect("refresh");
        assert_eq!(early.view.rows[0].effective, EffectiveStatus::Pending);
        let late = checklist.refresh(may(1), sp(1, 9, 30)).expect("refresh");
        assert_eq!(late.view.rows[0].effective, EffectiveStatus::Overdue);
    }

    #[test]
    fn number_item_requires_note() {
        let log = MemoryLog::default();
        let checklist = session(&log);
        let gauge = checklist.item("CALDEIRA", "Manha", "CB-02").unwrap().clone();

        let err = checklist
            .mark(&gauge, may(1), RawStatus::Ok, &operator(), None, sp(1, 10, 0))
            .expect_err("note is required");
        assert_eq!(err.code(), ErrorCode::NoteRequired);
        assert!(log.events().is_empty(), "nothing may reach the store");

        let err = checklist
            .mark(
                &gauge,
                may(1),
                RawStatus::Ok,
                &operator(),
                Some("   ".into()),
                sp(1, 10, 0),
            )
            .expect_err("blank note is no note");
        assert_eq!(err.code(), ErrorCode::NoteRequired);

        checklist
            .mark(
                &gauge,
                may(1),
                RawStatus::Ok,
                &operator(),
                Some("71,5".into()),
                sp(1, 10, 0),
            )
            .expect("valued mark succeeds");
        assert_eq!(log.events()[0].note.as_deref(), Some("71,5"));
    }

    #[test]
    fn unmark_of_number_item_needs_no_note() {
        let log = MemoryLog::default();
        let checklist = session(&log);
        let gauge = checklist.item("CALDEIRA", "Manha", "CB-02").unwrap().clone();
        checklist
            .unmark(&gauge, may(1), &operator(), sp(1, 10, 0))
            .expect("unmark never needs a value");
    }

    #[test]
    fn refresh_is_scoped_to_the_requested_day() {
        let log = MemoryLog::default();
        let checklist = session(&log);
        let item = checklist.item("CALDEIRA", "Manha", "CB-01").unwrap().clone();

        checklist
            .mark(&item, may(1), RawStatus::NotOk, &operator(), None, sp(1, 8, 0))
            .expect("mark");

        let other_day = checklist.refresh(may(2), sp(2, 8, 0)).expect("refresh");
        assert_eq!(other_day.view.rows[0].effective, EffectiveStatus::Pending);
    }

    #[test]
    fn unknown_item_lookup_is_none() {
        let log = MemoryLog::default();
        let checklist = session(&log);
        assert!(checklist.item("CALDEIRA", "Manha", "CB-99").is_none());
        assert!(checklist.item("CALDEIRA", "Noite", "CB-01").is_none());
    }
}
