//! Spreadsheet adapters: the narrow transport trait and the generic
//! log/catalog implementations over it.
//!
//! [`SheetTransport`] is the entire surface the application shell must
//! provide: list worksheet titles, read a grid, append a row. Auth,
//! HTTP, and per-attempt timeouts live behind it. Everything above
//! (worksheet resolution, fetch windowing, schema mapping, retry) is
//! handled here, so a transport implementation stays mechanical.

use chrono::FixedOffset;
use std::fmt;
use tracing::debug;

use rota_core::catalog::{Area, CatalogItem};
use rota_core::event::{EventRecord, ParsedLog, parse_events};

use crate::api::{CatalogSource, EventLogRead, EventLogWrite};
use crate::error::{ErrorCode, StoreError};
use crate::retry::RetryPolicy;
use crate::schema::{encode_event_row, grid_to_raw_events, parse_area_rows, parse_item_rows};

// ---------------------------------------------------------------------------
// SourceId
// ---------------------------------------------------------------------------

/// Opaque spreadsheet identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId(String);

impl SourceId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ---------------------------------------------------------------------------
// SheetTransport
// ---------------------------------------------------------------------------

/// The narrow transport surface over the spreadsheet store.
///
/// Implementations own credentials, HTTP, and per-attempt timeouts, and
/// classify failures into [`StoreError`] codes. A timeout must be
/// reported as [`ErrorCode::Timeout`] so the retry policy treats it
/// like rate limiting.
pub trait SheetTransport {
    /// Titles of all worksheets in a spreadsheet.
    fn worksheet_titles(&self, source: &SourceId) -> Result<Vec<String>, StoreError>;

    /// Full grid of one worksheet: header row first, then data rows in
    /// store order.
    fn read_grid(&self, source: &SourceId, worksheet: &str) -> Result<Vec<Vec<String>>, StoreError>;

    /// Append one row at the bottom of a worksheet.
    fn append_row(
        &self,
        source: &SourceId,
        worksheet: &str,
        row: Vec<String>,
    ) -> Result<(), StoreError>;
}

/// Resolve a worksheet from candidate titles: exact match first, then
/// case-insensitive.
pub fn pick_worksheet(titles: &[String], candidates: &[String]) -> Option<String> {
    for candidate in candidates {
        if titles.iter().any(|title| title == candidate) {
            return Some(candidate.clone());
        }
    }
    for candidate in candidates {
        if let Some(title) = titles
            .iter()
            .find(|title| title.eq_ignore_ascii_case(candidate))
        {
            return Some(title.clone());
        }
    }
    None
}

// ---------------------------------------------------------------------------
// SheetLog
// ---------------------------------------------------------------------------

/// Log reader/writer over a [`SheetTransport`].
///
/// Reads resolve the log worksheet, apply the fetch window, run the
/// grid through schema mapping and validation; writes encode the legacy
/// row layout. Every transport call goes through the retry policy.
pub struct SheetLog<T> {
    transport: T,
    source: SourceId,
    worksheet_candidates: Vec<String>,
    retry: RetryPolicy,
    /// Keep only the most recent N data rows per fetch; `None` reads
    /// everything.
    window_rows: Option<usize>,
    /// Offset attached to legacy zone-less `data` + `hora` cells.
    store_offset: FixedOffset,
}

impl<T: SheetTransport> SheetLog<T> {
    pub fn new(
        transport: T,
        source: SourceId,
        worksheet_candidates: Vec<String>,
        retry: RetryPolicy,
        window_rows: Option<usize>,
        store_offset: FixedOffset,
    ) -> Self {
        Self {
            transport,
            source,
            worksheet_candidates,
            retry,
            window_rows,
            store_offset,
        }
    }

    fn resolve_worksheet(&self) -> Result<String, StoreError> {
        let titles = self
            .retry
            .run(|| self.transport.worksheet_titles(&self.source))?;
        pick_worksheet(&titles, &self.worksheet_candidates).ok_or_else(|| {
            StoreError::new(
                ErrorCode::WorksheetNotFound,
                format!(
                    "no worksheet in {} matches {:?} (found {titles:?})",
                    self.source, self.worksheet_candidates
                ),
            )
        })
    }
}

impl<T: SheetTransport> EventLogRead for SheetLog<T> {
    fn fetch(&self) -> Result<ParsedLog, StoreError> {
        let worksheet = self.resolve_worksheet()?;
        let mut grid = self
            .retry
            .run(|| self.transport.read_grid(&self.source, &worksheet))?;

        // Window the *data* rows, keeping the header in place. The
        // reconciler never learns the log was truncated.
        if let Some(window) = self.window_rows {
            let data_rows = grid.len().saturating_sub(1);
            if data_rows > window {
                let skipped = data_rows - window;
                grid.drain(1..=skipped);
                debug!(skipped, window, "windowed log fetch");
            }
        }

        let parsed = parse_events(grid_to_raw_events(&grid, self.store_offset));
        debug!(
            events = parsed.events.len(),
            dropped = parsed.dropped,
            worksheet = worksheet.as_str(),
            "fetched event log"
        );
        Ok(parsed)
    }
}

impl<T: SheetTransport> EventLogWrite for SheetLog<T> {
    fn append(&self, event: &EventRecord) -> Result<(), StoreError> {
        let worksheet = self.resolve_worksheet()?;
        let row = encode_event_row(event);
        self.retry
            .run(|| self.transport.append_row(&self.source, &worksheet, row.clone()))
    }
}

// ---------------------------------------------------------------------------
// SheetCatalog
// ---------------------------------------------------------------------------

/// Catalog provider over a [`SheetTransport`]: AREAS and ITENS
/// worksheets on the catalog spreadsheet.
pub struct SheetCatalog<T> {
    transport: T,
    source: SourceId,
    area_candidates: Vec<String>,
    item_candidates: Vec<String>,
    retry: RetryPolicy,
}

impl<T: SheetTransport> SheetCatalog<T> {
    pub fn new(
        transport: T,
        source: SourceId,
        area_candidates: Vec<String>,
        item_candidates: Vec<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            source,
            area_candidates,
            item_candidates,
            retry,
        }
    }

    fn read_tab(&self, candidates: &[String]) -> Result<Vec<Vec<String>>, StoreError> {
        let titles = self
            .retry
            .run(|| self.transport.worksheet_titles(&self.source))?;
        let worksheet = pick_worksheet(&titles, candidates).ok_or_else(|| {
            StoreError::new(
                ErrorCode::WorksheetNotFound,
                format!(
                    "no worksheet in {} matches {candidates:?} (found {titles:?})",
                    self.source
                ),
            )
        })?;
        self.retry
            .run(|| self.transport.read_grid(&self.source, &worksheet))
    }
}

impl<T: SheetTransport> CatalogSource for SheetCatalog<T> {
    fn areas(&self) -> Result<Vec<Area>, StoreError> {
        Ok(parse_area_rows(&self.read_tab(&self.area_candidates)?))
    }

    fn items(&self) -> Result<Vec<CatalogItem>, StoreError> {
        Ok(parse_item_rows(&self.read_tab(&self.item_candidates)?))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
