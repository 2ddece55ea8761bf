//! Event data model for the rota checklist log.
//!
//! This module defines [`EventRecord`], one row of the append-only
//! log, and [`EntityKey`], the identity a record reconciles under.
//! Parsing raw tabular rows into records is handled by the [`parse`]
//! submodule.
//!
//! # Log row layout (canonical columns)
//!
//! ```text
//! timestamp | day | area_id | shift | item_id | item_text | status | actor_login | actor_name | note
//! ```
//!
//! Records are immutable once created: the log is append-only, and a
//! correction is a new row with a later timestamp, never an edit.

pub mod parse;

pub use parse::{ParsedLog, RawEvent, RowError, parse_event, parse_events};

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::status::RawStatus;

// ---------------------------------------------------------------------------
// EntityKey
// ---------------------------------------------------------------------------

/// The identity one checklist line reconciles under: one item, in one
/// area and shift, on one calendar day.
///
/// `day` is the date the event *applies to*, not the date it was
/// recorded: a late entry written on Tuesday for Monday's checklist
/// belongs to Monday's key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub day: NaiveDate,
    pub area_id: String,
    pub shift: String,
    pub item_id: String,
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.day, self.area_id, self.shift, self.item_id
        )
    }
}

// ---------------------------------------------------------------------------
// EventRecord
// ---------------------------------------------------------------------------

/// A single state transition in the checklist log.
///
/// # Fields
///
/// - `timestamp`: instant with timezone; the last-writer-wins ordering
///   key.
/// - `day`: calendar date the event applies to. May differ from the
///   timestamp's date for late or backfilled entries.
/// - `area_id`, `shift`, `item_id`: composite entity identity.
/// - `item_text`: human-readable label at the time of the action,
///   carried for audit/display; not part of identity.
/// - `raw_status`: the recorded state; `Pending` represents an explicit
///   unmark.
/// - `actor_login`, `actor_name`: who acted; audit only.
/// - `note`: free-form value for numeric/text-answer items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Instant the action was recorded; the ordering key.
    pub timestamp: DateTime<FixedOffset>,

    /// Calendar date the action applies to.
    pub day: NaiveDate,

    /// Area the item belongs to.
    pub area_id: String,

    /// Shift the item belongs to (free-form, catalog-defined).
    pub shift: String,

    /// Item identifier within the catalog.
    pub item_id: String,

    /// Item label at the time of the action.
    pub item_text: String,

    /// Recorded status.
    pub raw_status: RawStatus,

    /// Login of the actor.
    pub actor_login: String,

    /// Display name of the actor.
    pub actor_name: String,

    /// Free-form answer value, if the item carries one.
    pub note: Option<String>,
}

impl EventRecord {
    /// The entity key this record reconciles under.
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey {
            day: self.day,
            area_id: self.area_id.clone(),
            shift: self.shift.clone(),
            item_id: self.item_id.clone(),
        }
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} by {}",
            self.timestamp.to_rfc3339(),
            self.key(),
            self.raw_status,
            self.actor_login
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
