//! Store configuration.
//!
//! One TOML file describes everything the boundary needs: which
//! spreadsheets hold the catalog and the log, which worksheet titles to
//! try (sheets get renamed by hand, so each is a candidate list), how
//! aggressively to window fetches, the retry tuning, and the fixed UTC
//! offset the legacy zone-less rows are interpreted in.
//!
//! Every field except the two spreadsheet ids has a default, so a
//! minimal file is just:
//!
//! ```toml
//! [sheets]
//! catalog = "1AbC..."
//! logs = "1DeF..."
//! ```

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub sheets: SheetIds,
    #[serde(default)]
    pub tabs: TabConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub clock: ClockConfig,
}

/// Spreadsheet ids. Both are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetIds {
    /// Spreadsheet holding the AREAS and ITENS worksheets.
    pub catalog: String,
    /// Spreadsheet holding the append-only log worksheet.
    pub logs: String,
}

/// Worksheet title candidates, tried in order (exact, then
/// case-insensitive).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabConfig {
    #[serde(default = "default_area_tabs")]
    pub areas: Vec<String>,
    #[serde(default = "default_item_tabs")]
    pub items: Vec<String>,
    #[serde(default = "default_log_tabs")]
    pub logs: Vec<String>,
}

impl Default for TabConfig {
    fn default() -> Self {
        Self {
            areas: default_area_tabs(),
            items: default_item_tabs(),
            logs: default_log_tabs(),
        }
    }
}

/// Fetch cost controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Read only the most recent N log rows; absent means the full log.
    #[serde(default)]
    pub window_rows: Option<usize>,
    /// Per-attempt timeout the transport should enforce, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            window_rows: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Retry tuning; converted with [`RetryConfig::policy`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay_ms: self.base_delay_ms,
            max_delay_ms: self.max_delay_ms,
        }
    }
}

/// Timezone of the zone-less legacy rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Minutes east of UTC; the default is America/Sao_Paulo (-180).
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

impl ClockConfig {
    /// The configured offset; an out-of-range value falls back to UTC.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"))
    }
}

fn default_area_tabs() -> Vec<String> {
    vec!["AREAS".into(), "ÁREAS".into(), "areas".into()]
}

fn default_item_tabs() -> Vec<String> {
    vec!["ITENS".into(), "ITEMS".into(), "itens".into()]
}

fn default_log_tabs() -> Vec<String> {
    vec!["LOGS".into(), "LOG".into(), "REGISTROS".into(), "records".into()]
}

const fn default_timeout_secs() -> u64 {
    20
}

const fn default_max_attempts() -> u32 {
    4
}

const fn default_base_delay_ms() -> u64 {
    250
}

const fn default_max_delay_ms() -> u64 {
    10_000
}

const fn default_utc_offset_minutes() -> i32 {
    -180
}

/// Load a [`StoreConfig`] from a TOML file.
pub fn load_store_config(path: &Path) -> Result<StoreConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading store config at {}", path.display()))?;
    let config: StoreConfig = toml::from_str(&raw)
        .with_context(|| format!("parsing store config at {}", path.display()))?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn minimal_config_fills_defaults() {
        let config: StoreConfig = toml::from_str(
            r#"
            [sheets]
            catalog = "cat123"
            logs = "log456"
            "#,
        )
        .expect("minimal config parses");

        assert_eq!(config.sheets.catalog, "cat123");
        assert_eq!(config.tabs.logs[0], "LOGS");
        assert_eq!(config.fetch.window_rows, None);
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.clock.utc_offset_minutes, -180);
        assert_eq!(config.clock.offset().local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn overrides_apply() {
        let config: StoreConfig = toml::from_str(
            r#"
            [sheets]
            catalog = "cat"
            logs = "log"

            [tabs]
            logs = ["EVENTOS"]

            [fetch]
            window_rows = 500

            [retry]
            max_attempts = 2
            base_delay_ms = 50

            [clock]
            utc_offset_minutes = 0
            "#,
        )
        .expect("full config parses");

        assert_eq!(config.tabs.logs, vec!["EVENTOS".to_owned()]);
        assert_eq!(config.fetch.window_rows, Some(500));
        assert_eq!(config.retry.policy().max_attempts, 2);
        assert_eq!(config.retry.policy().base_delay_ms, 50);
        assert_eq!(config.clock.offset().local_minus_utc(), 0);
        // Unset retry fields keep their defaults.
        assert_eq!(config.retry.max_delay_ms, 10_000);
    }

    #[test]
    fn missing_sheet_ids_fail() {
        let result: Result<StoreConfig, _> = toml::from_str("[tabs]\n");
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let clock = ClockConfig {
            utc_offset_minutes: 100_000,
        };
        assert_eq!(clock.offset().local_minus_utc(), 0);
    }

    #[test]
    fn load_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[sheets]\ncatalog = \"c\"\nlogs = \"l\"").expect("write");
        let config = load_store_config(file.path()).expect("load");
        assert_eq!(config.sheets.logs, "l");
    }

    #[test]
    fn load_surfaces_parse_errors_with_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "not toml at all [").expect("write");
        let err = load_store_config(file.path()).expect_err("should fail");
        assert!(err.to_string().contains("parsing store config"));
    }
}
