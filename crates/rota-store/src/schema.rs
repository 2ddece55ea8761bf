//! Schema mapping: spreadsheet grids → canonical rows, and back.
//!
//! The spreadsheet is edited by people, and its headers have drifted
//! across years of use: `item_id` vs `id_item`, `texto` vs
//! `item_texto`, accented and re-cased variants of everything. All of
//! that tolerance lives *here*, in one explicit mapping step at the
//! boundary. By the time data reaches the reconciler it is canonical
//! [`RawEvent`] columns, and the engine knows nothing about header
//! spellings.
//!
//! Reads: [`grid_to_raw_events`], [`parse_area_rows`],
//! [`parse_item_rows`]. Writes: [`encode_event_row`], which produces
//! the legacy 11-column log layout so new rows land next to old ones.
//!
//! Legacy log rows carry a zone-less `data` + `hora` pair; the mapper
//! attaches the store's configured UTC offset when composing the
//! RFC 3339 timestamp. Rows written with an explicit `timestamp`
//! column are taken as-is.

use std::collections::HashMap;

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone, Weekday};
use tracing::warn;

use rota_core::catalog::{Area, CatalogItem, ResponseKind, UNORDERED};
use rota_core::deadline::Deadline;
use rota_core::event::{EventRecord, RawEvent};
use rota_core::status::RawStatus;

// ---------------------------------------------------------------------------
// Legacy log layout
// ---------------------------------------------------------------------------

/// Column order of the legacy log worksheet. New rows are appended in
/// this exact layout.
pub const LOG_HEADER: [&str; 11] = [
    "data",
    "hora",
    "dia_semana",
    "user_login",
    "user_nome",
    "area_id",
    "turno",
    "item_id",
    "texto",
    "status",
    "obs",
];

// ---------------------------------------------------------------------------
// Text normalization
// ---------------------------------------------------------------------------

/// Trim and replace non-breaking spaces (pasted from office tools).
#[must_use]
pub fn norm(raw: &str) -> String {
    raw.replace('\u{a0}', " ").trim().to_owned()
}

/// Normalize a header cell into a lookup key: lowercase, Portuguese
/// diacritics folded, whitespace runs collapsed to `_`.
#[must_use]
pub fn norm_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_sep = true;
    for ch in norm(raw).chars() {
        let ch = match ch {
            'ã' | 'á' | 'à' | 'â' | 'Ã' | 'Á' | 'À' | 'Â' => 'a',
            'é' | 'ê' | 'É' | 'Ê' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'ô' | 'õ' | 'Ó' | 'Ô' | 'Õ' => 'o',
            'ú' | 'Ú' => 'u',
            'ç' | 'Ç' => 'c',
            c => c,
        };
        if ch.is_whitespace() {
            if !last_sep {
                out.push('_');
                last_sep = true;
            }
        } else {
            out.extend(ch.to_lowercase());
            last_sep = false;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Parse a spreadsheet boolean cell. Accepts `true`/`1`/`sim`/`yes`/`y`;
/// everything else (including empty) is false.
#[must_use]
pub fn parse_bool(raw: &str) -> bool {
    matches!(norm_key(raw).as_str(), "true" | "1" | "sim" | "yes" | "y")
}

/// Parse a display-order cell; missing or non-numeric sorts last.
#[must_use]
pub fn parse_order(raw: &str) -> u32 {
    norm(raw).parse().unwrap_or(UNORDERED)
}

/// Parse a numeric threshold cell, accepting the decimal comma.
#[must_use]
pub fn parse_minimum(raw: &str) -> Option<f64> {
    let text = norm(raw).replace(',', ".");
    if text.is_empty() { None } else { text.parse().ok() }
}

/// Parse a response-type cell (`OK, Nao OK` / `NUMERO` / `TEXTO`).
/// Unrecognized values are plain check items.
#[must_use]
pub fn parse_response_kind(raw: &str) -> ResponseKind {
    let key = norm_key(raw);
    if key.contains("numero") {
        ResponseKind::Number
    } else if key.contains("texto") {
        ResponseKind::Text
    } else {
        ResponseKind::Check
    }
}

// ---------------------------------------------------------------------------
// Header resolution
// ---------------------------------------------------------------------------

/// Index of a grid's header row, keyed by normalized header text.
struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    fn new(header: &[String]) -> Self {
        let mut columns = HashMap::new();
        for (index, cell) in header.iter().enumerate() {
            let key = norm_key(cell);
            if !key.is_empty() {
                // First occurrence wins when a sheet has duplicate headers.
                columns.entry(key).or_insert(index);
            }
        }
        Self { columns }
    }

    /// Resolve the first matching candidate name to a column index.
    fn find(&self, candidates: &[&str]) -> Option<usize> {
        candidates
            .iter()
            .find_map(|name| self.columns.get(&norm_key(name)).copied())
    }
}

/// Fetch a cell by resolved index; rows shorter than the header read as
/// empty cells.
fn cell(row: &[String], index: Option<usize>) -> String {
    index
        .and_then(|i| row.get(i))
        .map(|value| norm(value))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Log rows → canonical events
// ---------------------------------------------------------------------------

/// Compose an RFC 3339 timestamp from legacy `data` + `hora` cells and
/// the store offset. Seconds are optional in `hora`.
fn compose_timestamp(date: &str, time: &str, offset: FixedOffset) -> Option<String> {
    let date = NaiveDate::parse_from_str(norm(date).as_str(), "%Y-%m-%d").ok()?;
    let time_text = norm(time);
    let time = NaiveTime::parse_from_str(&time_text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&time_text, "%H:%M"))
        .ok()?;
    let instant = offset.from_local_datetime(&date.and_time(time)).single()?;
    Some(instant.to_rfc3339())
}

/// Map a log worksheet grid (header row + data rows, arrival order)
/// into canonical [`RawEvent`] rows.
///
/// Unknown extra columns are ignored; missing optional columns read as
/// empty. Rows whose timestamp cannot be composed keep their raw text
/// so the engine's validation drops *and counts* them; nothing
/// disappears silently at this layer.
#[must_use]
pub fn grid_to_raw_events(grid: &[Vec<String>], offset: FixedOffset) -> Vec<RawEvent> {
    let Some((header, rows)) = grid.split_first() else {
        return Vec::new();
    };
    let index = HeaderIndex::new(header);

    let col_timestamp = index.find(&["timestamp", "carimbo"]);
    let col_date = index.find(&["data", "date"]);
    let col_time = index.find(&["hora", "time"]);
    let col_area = index.find(&["area_id", "id_area"]);
    let col_shift = index.find(&["turno", "shift"]);
    let col_item = index.find(&["item_id", "id_item"]);
    let col_text = index.find(&["texto", "item_texto", "descricao", "descrição"]);
    let col_status = index.find(&["status"]);
    let col_login = index.find(&["user_login", "login", "usuario", "usuário"]);
    let col_name = index.find(&["user_nome", "nome", "name"]);
    let col_note = index.find(&["obs", "observacao", "observação", "note"]);

    rows.iter()
        .map(|row| {
            let date = cell(row, col_date);
            let explicit = cell(row, col_timestamp);
            let timestamp = if explicit.is_empty() {
                let time = cell(row, col_time);
                compose_timestamp(&date, &time, offset)
                    .unwrap_or_else(|| format!("{date} {time}"))
            } else {
                explicit
            };
            RawEvent {
                timestamp,
                day: date,
                area_id: cell(row, col_area),
                shift: cell(row, col_shift),
                item_id: cell(row, col_item),
                item_text: cell(row, col_text),
                status: cell(row, col_status),
                actor_login: cell(row, col_login),
                actor_name: cell(row, col_name),
                note: cell(row, col_note),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Catalog worksheets
// ---------------------------------------------------------------------------

/// Map an AREAS worksheet grid into [`Area`]s. Rows without an id are
/// skipped with a warning; a missing name falls back to the id.
#[must_use]
pub fn parse_area_rows(grid: &[Vec<String>]) -> Vec<Area> {
    let Some((header, rows)) = grid.split_first() else {
        return Vec::new();
    };
    let index = HeaderIndex::new(header);
    let col_id = index.find(&["area_id", "id_area"]);
    let col_name = index.find(&["area_nome", "nome_area", "area"]);
    let col_active = index.find(&["ativo", "active"]);
    let col_order = index.find(&["ordem", "order"]);

    rows.iter()
        .enumerate()
        .filter_map(|(position, row)| {
            let area_id = cell(row, col_id);
            if area_id.is_empty() {
                warn!(row = position, "skipping area row without area_id");
                return None;
            }
            let name = cell(row, col_name);
            Some(Area {
                name: if name.is_empty() { area_id.clone() } else { name },
                area_id,
                active: col_active.is_none() || parse_bool(&cell(row, col_active)),
                display_order: parse_order(&cell(row, col_order)),
            })
        })
        .collect()
}

/// Map an ITENS worksheet grid into [`CatalogItem`]s. Rows missing any
/// identity column (item, area, shift) are skipped with a warning.
#[must_use]
pub fn parse_item_rows(grid: &[Vec<String>]) -> Vec<CatalogItem> {
    let Some((header, rows)) = grid.split_first() else {
        return Vec::new();
    };
    let index = HeaderIndex::new(header);
    let col_id = index.find(&["item_id", "id_item"]);
    let col_text = index.find(&["item_texto", "texto", "descricao", "descrição"]);
    let col_area = index.find(&["area_id", "id_area"]);
    let col_shift = index.find(&["turno", "shift"]);
    let col_order = index.find(&["ordem", "order"]);
    let col_response = index.find(&["tipo_resposta", "tipo", "resposta"]);
    let col_deadline = index.find(&["deadline_hhmm", "deadline", "prazo", "hora_deadline"]);
    let col_tolerance = index.find(&["tolerancia_min", "tolerancia", "tolerance_minutes"]);
    let col_critical = index.find(&["critico", "crítico", "critical"]);
    let col_minimum = index.find(&["min", "minimo", "mínimo"]);
    let col_active = index.find(&["ativo", "active"]);

    rows.iter()
        .enumerate()
        .filter_map(|(position, row)| {
            let item_id = cell(row, col_id);
            let area_id = cell(row, col_area);
            let shift = cell(row, col_shift);
            if item_id.is_empty() || area_id.is_empty() || shift.is_empty() {
                warn!(row = position, "skipping item row with incomplete identity");
                return None;
            }
            Some(CatalogItem {
                text: cell(row, col_text),
                response: parse_response_kind(&cell(row, col_response)),
                critical: parse_bool(&cell(row, col_critical)),
                minimum: parse_minimum(&cell(row, col_minimum)),
                deadline: Deadline::parse(&cell(row, col_deadline)),
                tolerance_minutes: norm(&cell(row, col_tolerance)).parse().unwrap_or(0),
                active: col_active.is_none() || parse_bool(&cell(row, col_active)),
                display_order: parse_order(&cell(row, col_order)),
                item_id,
                area_id,
                shift,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Event → legacy row
// ---------------------------------------------------------------------------

/// Portuguese weekday label, as the legacy log records it.
#[must_use]
pub fn weekday_label(day: NaiveDate) -> &'static str {
    match chrono::Datelike::weekday(&day) {
        Weekday::Mon => "Segunda",
        Weekday::Tue => "Terca",
        Weekday::Wed => "Quarta",
        Weekday::Thu => "Quinta",
        Weekday::Fri => "Sexta",
        Weekday::Sat => "Sabado",
        Weekday::Sun => "Domingo",
    }
}

/// Legacy status spelling used in the log worksheet.
#[must_use]
pub const fn legacy_status_label(status: RawStatus) -> &'static str {
    match status {
        RawStatus::Ok => "OK",
        RawStatus::NotOk => "NAO_OK",
        RawStatus::Pending => "PENDENTE",
    }
}

/// Encode an event into the legacy 11-column log row ([`LOG_HEADER`]).
///
/// The `hora` cell uses the wall-clock time in the timestamp's own
/// offset, matching how the legacy writers recorded it.
#[must_use]
pub fn encode_event_row(event: &EventRecord) -> Vec<String> {
    vec![
        event.day.format("%Y-%m-%d").to_string(),
        event.timestamp.format("%H:%M:%S").to_string(),
        weekday_label(event.day).to_owned(),
        event.actor_login.clone(),
        event.actor_name.clone(),
        event.area_id.clone(),
        event.shift.clone(),
        event.item_id.clone(),
        event.item_text.clone(),
        legacy_status_label(event.raw_status).to_owned(),
        event.note.clone().unwrap_or_default(),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
