//! Deadline policy: when does a pending item become overdue?
//!
//! A [`Deadline`] is a validated time-of-day from the catalog
//! (`deadline_hhmm`). [`is_overdue`] is the single place the engine
//! compares a checklist day against the current instant:
//!
//! - a *past* day with a configured deadline is overdue outright,
//! - a *future* day never is,
//! - *today* is overdue strictly after `deadline + tolerance`.
//!
//! Both functions are total. Malformed deadline text means "no deadline
//! configured" (never overdue), not an error: a typo in one catalog
//! cell must not take the dashboard down. `now` is always an explicit,
//! zone-aware argument; the engine never reads the host clock.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

/// A validated deadline time-of-day (24-hour clock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Deadline {
    hour: u8,
    minute: u8,
}

impl Deadline {
    /// Parse `H:MM` or `HH:MM` deadline text.
    ///
    /// Returns `None` for empty, malformed, or out-of-range input
    /// (hour >= 24 or minute >= 60); an unusable deadline is treated as
    /// absent rather than an error.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (hh, mm) = raw.split_once(':')?;
        if hh.is_empty() || hh.len() > 2 || mm.len() != 2 {
            return None;
        }
        if !hh.bytes().all(|b| b.is_ascii_digit()) || !mm.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let hour: u8 = hh.parse().ok()?;
        let minute: u8 = mm.parse().ok()?;
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self { hour, minute })
    }

    /// The deadline as a [`NaiveTime`] (seconds are always zero).
    #[must_use]
    pub fn time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for Deadline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid deadline time: '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Overdue evaluation
// ---------------------------------------------------------------------------

/// Decide whether a deadline has passed for `target_day` at instant
/// `now`.
///
/// Pure and total. Calendar comparisons use `now`'s own offset: the
/// caller chooses the operation's timezone by the offset it passes in.
///
/// Only meaningful for items whose raw status is pending; OK/NOT_OK are
/// terminal for the day and the classifier never consults this.
#[must_use]
pub fn is_overdue(
    target_day: NaiveDate,
    deadline: Option<Deadline>,
    tolerance_minutes: u32,
    now: DateTime<FixedOffset>,
) -> bool {
    let Some(deadline) = deadline else {
        return false;
    };
    let today = now.date_naive();
    if target_day < today {
        return true;
    }
    if target_day > today {
        return false;
    }
    let cutoff = target_day.and_time(deadline.time()) + Duration::minutes(i64::from(tolerance_minutes));
    now.naive_local() > cutoff
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
