//! Raw row validation.
//!
//! The store boundary resolves spreadsheet header aliases into
//! [`RawEvent`], canonical column strings. This module turns those
//! strings into well-typed [`EventRecord`]s, or classifies a row as
//! unusable.
//!
//! Unusable rows are *dropped and counted*, never fatal: a row whose
//! timestamp does not parse cannot be ordered, and a row without an
//! item id or an attributable day has no identity. Neither may
//! block the rest of the batch. Status text is total by construction
//! ([`RawStatus::normalize`]) and never drops a row.

use chrono::{DateTime, NaiveDate};
use tracing::warn;

use crate::event::EventRecord;
use crate::status::RawStatus;

// ---------------------------------------------------------------------------
// RawEvent
// ---------------------------------------------------------------------------

/// One log row after schema mapping: canonical columns, still strings.
///
/// Missing optional columns arrive as empty strings; the boundary is
/// expected to have discarded unknown extra columns already.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    /// RFC 3339 instant, e.g. `2024-05-01T09:05:00-03:00`.
    pub timestamp: String,
    /// ISO calendar date the event applies to; empty means "use the
    /// timestamp's date".
    pub day: String,
    pub area_id: String,
    pub shift: String,
    pub item_id: String,
    pub item_text: String,
    pub status: String,
    pub actor_login: String,
    pub actor_name: String,
    pub note: String,
}

// ---------------------------------------------------------------------------
// RowError
// ---------------------------------------------------------------------------

/// Why a row was excluded from reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    /// The timestamp is not an RFC 3339 instant, so the row cannot be
    /// ordered.
    #[error("unparsable timestamp '{0}'")]
    InvalidTimestamp(String),

    /// The day column is non-empty but not an ISO date, so the row cannot
    /// be attributed to a day.
    #[error("unparsable day '{0}'")]
    InvalidDay(String),

    /// No item id, so the row has no entity identity.
    #[error("missing item_id")]
    MissingItemId,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse one canonical row into an [`EventRecord`].
///
/// Identity and audit fields are whitespace-trimmed; an empty note
/// becomes `None`. Status text never fails: unrecognized values
/// normalize to `Pending`.
pub fn parse_event(raw: &RawEvent) -> Result<EventRecord, RowError> {
    let timestamp = DateTime::parse_from_rfc3339(raw.timestamp.trim())
        .map_err(|_| RowError::InvalidTimestamp(raw.timestamp.clone()))?;

    let day_text = raw.day.trim();
    let day = if day_text.is_empty() {
        timestamp.date_naive()
    } else {
        NaiveDate::parse_from_str(day_text, "%Y-%m-%d")
            .map_err(|_| RowError::InvalidDay(raw.day.clone()))?
    };

    let item_id = raw.item_id.trim();
    if item_id.is_empty() {
        return Err(RowError::MissingItemId);
    }

    let note = raw.note.trim();
    Ok(EventRecord {
        timestamp,
        day,
        area_id: raw.area_id.trim().to_owned(),
        shift: raw.shift.trim().to_owned(),
        item_id: item_id.to_owned(),
        item_text: raw.item_text.trim().to_owned(),
        raw_status: RawStatus::normalize(&raw.status),
        actor_login: raw.actor_login.trim().to_owned(),
        actor_name: raw.actor_name.trim().to_owned(),
        note: if note.is_empty() {
            None
        } else {
            Some(note.to_owned())
        },
    })
}

/// A parsed batch: the usable records, in arrival order, plus how many
/// rows were excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLog {
    /// Records that survived validation, in arrival order.
    pub events: Vec<EventRecord>,
    /// Rows excluded from reconciliation.
    pub dropped: usize,
}

/// Parse a batch of canonical rows, dropping and counting unusable ones.
///
/// Never fails: each excluded row is logged at `warn` level with its
/// reason and position, and reflected in [`ParsedLog::dropped`].
pub fn parse_events<I>(rows: I) -> ParsedLog
where
    I: IntoIterator<Item = RawEvent>,
{
    let mut parsed = ParsedLog::default();
    for (index, raw) in rows.into_iter().enumerate() {
        match parse_event(&raw) {
            Ok(event) => parsed.events.push(event),
            Err(reason) => {
                warn!(row = index, %reason, "dropping unusable log row");
                parsed.dropped += 1;
            }
        }
    }
    parsed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
