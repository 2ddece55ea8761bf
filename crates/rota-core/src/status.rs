//! Checklist status enums.
//!
//! [`RawStatus`] is what the log stores: the literal state recorded by
//! the most recent event for an entity key. [`EffectiveStatus`] is what
//! callers display: the raw status after deadline/tolerance evaluation,
//! which adds the derived `Overdue` state.
//!
//! # Normalization
//!
//! Log rows come from a spreadsheet edited by humans and by several
//! generations of writers, so status text arrives in many spellings:
//! `OK`, `NAO_OK`, `NÃO_OK`, `NAO OK`, `not ok`, `PENDENTE`, empty
//! cells. [`RawStatus::normalize`] folds case, whitespace, and the
//! Portuguese diacritics that occur in practice, and maps anything it
//! still does not recognize to `Pending`. A malformed status must never
//! block the rest of the pipeline, and pending is the safest, most
//! visible state to land in.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// RawStatus
// ---------------------------------------------------------------------------

/// The literal status stored in the event log.
///
/// `Pending` doubles as the explicit "unmark" action: un-marking an item
/// is recorded as a real event whose status is `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RawStatus {
    Ok,
    NotOk,
    Pending,
}

impl RawStatus {
    /// All raw statuses, in display order.
    pub const ALL: [Self; 3] = [Self::Ok, Self::NotOk, Self::Pending];

    /// Canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotOk => "NOT_OK",
            Self::Pending => "PENDING",
        }
    }

    /// Whether this status closes the item for the day.
    ///
    /// Terminal statuses are never re-classified as overdue.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ok | Self::NotOk)
    }

    /// Normalize raw status text into a canonical value.
    ///
    /// Total: unrecognized text (and empty cells) normalize to
    /// `Pending` rather than erroring.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        match fold_status_key(raw).as_str() {
            "OK" => Self::Ok,
            "NOT_OK" | "NAO_OK" => Self::NotOk,
            _ => Self::Pending,
        }
    }
}

impl fmt::Display for RawStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uppercase, trim, fold diacritics, and collapse separators to `_`.
///
/// Only the accented characters that actually occur in the legacy log
/// are folded; this is a status-text folder, not a general transliterator.
fn fold_status_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_sep = true;
    for ch in raw.trim().chars() {
        let ch = match ch {
            'ã' | 'á' | 'à' | 'â' | 'Ã' | 'Á' | 'À' | 'Â' => 'A',
            'é' | 'ê' | 'É' | 'Ê' => 'E',
            'í' | 'Í' => 'I',
            'ó' | 'ô' | 'õ' | 'Ó' | 'Ô' | 'Õ' => 'O',
            'ú' | 'Ú' => 'U',
            'ç' | 'Ç' => 'C',
            c => c,
        };
        if ch.is_whitespace() || ch == '_' || ch == '-' || ch == '\u{a0}' {
            if !last_sep {
                out.push('_');
                last_sep = true;
            }
        } else {
            out.extend(ch.to_uppercase());
            last_sep = false;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

// ---------------------------------------------------------------------------
// EffectiveStatus
// ---------------------------------------------------------------------------

/// Status after deadline/tolerance evaluation; what callers display.
///
/// `Overdue` is derived, never stored: it is only reachable when the raw
/// status is `Pending` (or no event exists) and the item's deadline has
/// passed beyond tolerance for a day that is not in the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectiveStatus {
    Ok,
    NotOk,
    Pending,
    Overdue,
}

impl EffectiveStatus {
    /// All effective statuses, in display order.
    pub const ALL: [Self; 4] = [Self::Ok, Self::NotOk, Self::Pending, Self::Overdue];

    /// Canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotOk => "NOT_OK",
            Self::Pending => "PENDING",
            Self::Overdue => "OVERDUE",
        }
    }
}

impl From<RawStatus> for EffectiveStatus {
    fn from(raw: RawStatus) -> Self {
        match raw {
            RawStatus::Ok => Self::Ok,
            RawStatus::NotOk => Self::NotOk,
            RawStatus::Pending => Self::Pending,
        }
    }
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
