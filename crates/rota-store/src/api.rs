//! The abstract interfaces the engine consumes.
//!
//! Concrete transport/storage is an excluded collaborator: the
//! application shell picks (or implements) something satisfying these
//! traits and hands it to the session layer. The [`crate::sheets`]
//! adapters implement all three over a narrow spreadsheet transport.

use rota_core::catalog::{Area, CatalogItem};
use rota_core::event::{EventRecord, ParsedLog};

use crate::error::StoreError;

/// Read-only access to the catalog of areas and inspection items.
///
/// The engine does not cache or validate freshness of this data beyond
/// what callers supply per classification call.
pub trait CatalogSource {
    fn areas(&self) -> Result<Vec<Area>, StoreError>;
    fn items(&self) -> Result<Vec<CatalogItem>, StoreError>;
}

/// Fetch the raw event sequence for one log source.
///
/// Rows arrive in store order, possibly truncated to the most recent N
/// rows by the implementation for cost control; the returned
/// [`ParsedLog`] already carries canonical records plus the count of
/// rows dropped by validation.
pub trait EventLogRead {
    fn fetch(&self) -> Result<ParsedLog, StoreError>;
}

/// Append one event to the log.
///
/// Fire-and-forget from the engine's perspective: success or failure,
/// no confirmation payload.
pub trait EventLogWrite {
    fn append(&self, event: &EventRecord) -> Result<(), StoreError>;
}
