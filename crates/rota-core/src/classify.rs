//! Status classification and aggregation.
//!
//! Combines the reconciler's per-key winners with catalog metadata to
//! produce the effective status per item, the per-(area, shift)
//! aggregate counts, and the presentation-ready day view.
//!
//! Classification rules:
//!
//! - a reconciled OK / NOT_OK is terminal for the day; the deadline is
//!   irrelevant once an item is resolved;
//! - PENDING (explicit or "no event at all") is evaluated against the
//!   deadline policy and may surface as OVERDUE.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use crate::deadline::is_overdue;
use crate::event::{EntityKey, EventRecord};
use crate::status::EffectiveStatus;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Effective status of one item on `day` at instant `now`.
///
/// `latest` is the reconciled winner for the item's entity key, or
/// `None` when no event was ever written. Absence is implicit PENDING,
/// not an error.
#[must_use]
pub fn classify(
    item: &CatalogItem,
    latest: Option<&EventRecord>,
    day: NaiveDate,
    now: DateTime<FixedOffset>,
) -> EffectiveStatus {
    if let Some(event) = latest {
        if event.raw_status.is_terminal() {
            return event.raw_status.into();
        }
    }
    if is_overdue(day, item.deadline, item.tolerance_minutes, now) {
        EffectiveStatus::Overdue
    } else {
        EffectiveStatus::Pending
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate counts for one (area, shift) group.
///
/// The four status counts always partition `total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSummary {
    pub area_id: String,
    pub shift: String,
    pub total: usize,
    pub ok: usize,
    pub not_ok: usize,
    pub pending: usize,
    pub overdue: usize,
}

impl ShiftSummary {
    fn new(area_id: String, shift: String) -> Self {
        Self {
            area_id,
            shift,
            total: 0,
            ok: 0,
            not_ok: 0,
            pending: 0,
            overdue: 0,
        }
    }

    fn tally(&mut self, status: EffectiveStatus) {
        self.total += 1;
        match status {
            EffectiveStatus::Ok => self.ok += 1,
            EffectiveStatus::NotOk => self.not_ok += 1,
            EffectiveStatus::Pending => self.pending += 1,
            EffectiveStatus::Overdue => self.overdue += 1,
        }
    }

    /// Completion ratio: OK over total. Zero for an empty group, never
    /// a division error.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn completion(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.ok as f64 / self.total as f64
        }
    }
}

/// Aggregate active items into per-(area, shift) summaries.
///
/// Output is sorted by (area_id, shift) so repeated runs over the same
/// snapshot render identically.
#[must_use]
pub fn summarize(
    items: &[CatalogItem],
    latest: &HashMap<EntityKey, EventRecord>,
    day: NaiveDate,
    now: DateTime<FixedOffset>,
) -> Vec<ShiftSummary> {
    let mut groups: HashMap<(String, String), ShiftSummary> = HashMap::new();
    for item in items.iter().filter(|item| item.active) {
        let status = classify(item, latest.get(&item.key_for(day)), day, now);
        groups
            .entry((item.area_id.clone(), item.shift.clone()))
            .or_insert_with(|| ShiftSummary::new(item.area_id.clone(), item.shift.clone()))
            .tally(status);
    }
    let mut summaries: Vec<ShiftSummary> = groups.into_values().collect();
    summaries.sort_by(|a, b| (&a.area_id, &a.shift).cmp(&(&b.area_id, &b.shift)));
    summaries
}

// ---------------------------------------------------------------------------
// Day view
// ---------------------------------------------------------------------------

/// One board row: an item, its effective status, and the event that
/// produced it (if any).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    pub item: CatalogItem,
    pub effective: EffectiveStatus,
    /// The reconciled winner for this item, `None` when nothing was
    /// ever written for the day.
    pub latest: Option<EventRecord>,
}

/// The full presentation-ready projection of one checklist day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayView {
    pub day: NaiveDate,
    /// Active items only, ordered by (area_id, shift, display_order,
    /// item_id).
    pub rows: Vec<ItemView>,
    pub summaries: Vec<ShiftSummary>,
}

/// Build the board and summaries for one day.
///
/// Inactive items are excluded. Row order is stable across runs:
/// catalog display order within (area, shift), item id as the final
/// tie-break.
#[must_use]
pub fn day_view(
    items: &[CatalogItem],
    latest: &HashMap<EntityKey, EventRecord>,
    day: NaiveDate,
    now: DateTime<FixedOffset>,
) -> DayView {
    let mut rows: Vec<ItemView> = items
        .iter()
        .filter(|item| item.active)
        .map(|item| ItemView {
            effective: classify(item, latest.get(&item.key_for(day)), day, now),
            latest: latest.get(&item.key_for(day)).cloned(),
            item: item.clone(),
        })
        .collect();
    rows.sort_by(|a, b| {
        (
            &a.item.area_id,
            &a.item.shift,
            a.item.display_order,
            &a.item.item_id,
        )
            .cmp(&(
                &b.item.area_id,
                &b.item.shift,
                b.item.display_order,
                &b.item.item_id,
            ))
    });
    DayView {
        day,
        rows,
        summaries: summarize(items, latest, day, now),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
