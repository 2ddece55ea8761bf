//! rota-core: checklist reconciliation engine.
//!
//! Turns an unordered, duplicate-prone, append-only event log into an
//! authoritative current-status view per (day, area, shift, item), and
//! classifies each item against its deadline and tolerance window.
//!
//! The pipeline, leaf to root:
//!
//! 1. [`event::parse`]: raw tabular rows → [`event::EventRecord`]s
//!    (unusable rows dropped and counted, never fatal);
//! 2. [`reconcile`]: last-writer-wins reduction to the winning record
//!    per [`event::EntityKey`];
//! 3. [`classify`]: effective status per catalog item via the
//!    [`deadline`] policy, plus per-(area, shift) aggregates;
//! 4. [`overlay`]: session-local read-your-writes buffer merged into
//!    fetched sequences.
//!
//! # Conventions
//!
//! - Everything here is pure and synchronous: `now`, the target day,
//!   and the event sequence are explicit arguments; no I/O, no ambient
//!   clock, no global state.
//! - Data-shape problems degrade to defined defaults (dropped-and-
//!   counted rows, PENDING fallbacks); only the store boundary in
//!   `rota-store` surfaces errors.
//! - Logging via `tracing` macros; no subscriber is installed here.

pub mod catalog;
pub mod classify;
pub mod deadline;
pub mod event;
pub mod overlay;
pub mod reconcile;
pub mod status;

pub use catalog::{Area, CatalogItem, ResponseKind};
pub use classify::{DayView, ItemView, ShiftSummary, classify, day_view, summarize};
pub use deadline::{Deadline, is_overdue};
pub use event::{EntityKey, EventRecord, ParsedLog, RawEvent, RowError, parse_event, parse_events};
pub use overlay::OverlayCache;
pub use reconcile::{reconcile, reconcile_for_day};
pub use status::{EffectiveStatus, RawStatus};
