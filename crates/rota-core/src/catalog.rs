//! Catalog types: the fixed inventory of areas and inspection items.
//!
//! The catalog is read-only input supplied by the caller per
//! classification call; the engine neither caches it nor validates its
//! freshness. Identity of an item is `(area_id, shift, item_id)`; the
//! checklist day completes that into an [`EntityKey`].

use serde::{Deserialize, Serialize};
use std::fmt;

use chrono::NaiveDate;

use crate::deadline::Deadline;
use crate::event::EntityKey;

/// Display order assigned to catalog rows that carry none, so they sort
/// after every explicitly ordered row.
pub const UNORDERED: u32 = 9999;

// ---------------------------------------------------------------------------
// Area
// ---------------------------------------------------------------------------

/// An inspection area (boiler house, loading dock, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub area_id: String,
    pub name: String,
    /// Inactive areas are hidden from board and summary views.
    pub active: bool,
    pub display_order: u32,
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.area_id, self.name)
    }
}

// ---------------------------------------------------------------------------
// ResponseKind
// ---------------------------------------------------------------------------

/// How an item is answered.
///
/// `Check` items are plain OK / NOT-OK marks. `Number` and `Text` items
/// additionally require a note (the measured value or observation) on
/// the write path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    #[default]
    Check,
    Number,
    Text,
}

impl ResponseKind {
    /// All response kinds.
    pub const ALL: [Self; 3] = [Self::Check, Self::Number, Self::Text];

    /// Whether marking an item of this kind requires a note value.
    #[must_use]
    pub const fn requires_note(self) -> bool {
        matches!(self, Self::Number | Self::Text)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Number => "number",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CatalogItem
// ---------------------------------------------------------------------------

/// One inspection item in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub item_id: String,
    pub area_id: String,
    /// Shift label (free-form, catalog-defined: "Manha", "Noite", ...).
    pub shift: String,
    /// Human-readable instruction text.
    pub text: String,
    /// How the item is answered.
    #[serde(default)]
    pub response: ResponseKind,
    /// Critical items are flagged for display; classification treats
    /// them no differently.
    #[serde(default)]
    pub critical: bool,
    /// Threshold metadata for `Number` items, display only.
    #[serde(default)]
    pub minimum: Option<f64>,
    /// Time-of-day deadline; absent means the item can stay pending
    /// forever without becoming overdue.
    #[serde(default)]
    pub deadline: Option<Deadline>,
    /// Grace period after the deadline, in minutes.
    #[serde(default)]
    pub tolerance_minutes: u32,
    /// Inactive items are hidden from board and summary views.
    pub active: bool,
    pub display_order: u32,
}

impl CatalogItem {
    /// The entity key this item reconciles under on `day`.
    #[must_use]
    pub fn key_for(&self, day: NaiveDate) -> EntityKey {
        EntityKey {
            day,
            area_id: self.area_id.clone(),
            shift: self.shift.clone(),
            item_id: self.item_id.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
