//! rota-store: the spreadsheet-store boundary for rota.
//!
//! `rota-core` is pure; everything that touches the outside world lives
//! here:
//!
//! - [`schema`]: the single mapping step between sheet grids (drifted
//!   headers, zone-less legacy timestamps) and canonical event rows;
//! - [`api`]: the abstract reader/writer/catalog interfaces the engine
//!   consumes;
//! - [`sheets`]: generic adapters implementing those interfaces over a
//!   narrow [`sheets::SheetTransport`] supplied by the application
//!   shell;
//! - [`retry`]: bounded exponential backoff for the rate-limited store
//!   API (retryable vs permanent per [`error::ErrorCode`]);
//! - [`config`]: TOML store configuration;
//! - [`session`]: per-user wiring of overlay cache between writes and
//!   reads.
//!
//! # Conventions
//!
//! - Errors: typed [`error::StoreError`] with machine-readable codes;
//!   `anyhow` only at config loading.
//! - Logging: `tracing` macros; no subscriber installed here.

pub mod api;
pub mod config;
pub mod error;
pub mod retry;
pub mod schema;
pub mod session;
pub mod sheets;

pub use api::{CatalogSource, EventLogRead, EventLogWrite};
pub use config::{StoreConfig, load_store_config};
pub use error::{ErrorCode, StoreError};
pub use retry::RetryPolicy;
pub use session::{Actor, Checklist, DayRefresh};
pub use sheets::{SheetCatalog, SheetLog, SheetTransport, SourceId};
