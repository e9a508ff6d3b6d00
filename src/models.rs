//! Data model for extracted events.
//!
//! One extraction run produces a flat list of [`EventRecord`]s. Records are
//! built fresh from each fetched document, never mutated, and discarded once
//! the playlist is rendered — the only persistent state in the system is the
//! rendered output text.

use itertools::Itertools;
use serde::{Serialize, Serializer};
use std::fmt;

/// Rendered in place of a missing date label.
pub const UNKNOWN_DATE_LABEL: &str = "??";
/// Rendered in place of a missing time label.
pub const UNKNOWN_TIME_LABEL: &str = "--:--";

/// A calendar label without a year, as listing pages print them (`06-08`).
///
/// `month` is declared first so the derived ordering is month-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayMonth {
    pub month: u8,
    pub day: u8,
}

impl fmt::Display for DayMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.day, self.month)
    }
}

impl Serialize for DayMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A 24-hour clock label (`21:00`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One playable event occurrence extracted from a listing page.
///
/// `date` and `time` are `None` when the page did not carry them near the
/// identifier — they render as the unknown placeholders, never as guessed
/// values. `content_id` is always an exact 40-character lowercase hex token;
/// the extractor never constructs a record around anything else.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub date: Option<DayMonth>,
    pub time: Option<ClockTime>,
    pub category: String,
    pub name: String,
    pub content_id: String,
}

impl EventRecord {
    /// Date label for display, `??` when unknown.
    pub fn date_label(&self) -> String {
        match self.date {
            Some(d) => d.to_string(),
            None => UNKNOWN_DATE_LABEL.to_string(),
        }
    }

    /// Time label for display, `--:--` when unknown.
    pub fn time_label(&self) -> String {
        match self.time {
            Some(t) => t.to_string(),
            None => UNKNOWN_TIME_LABEL.to_string(),
        }
    }

    /// Short identifier prefix used for human disambiguation in display
    /// names. `content_id` is ASCII hex, so byte slicing is safe.
    pub fn id_prefix(&self, len: usize) -> &str {
        &self.content_id[..len.min(self.content_id.len())]
    }

    /// The uniqueness key: two records with equal keys are the same event
    /// occurrence.
    pub fn key(&self) -> (String, Option<DayMonth>, Option<ClockTime>, String) {
        (
            self.name.clone(),
            self.date,
            self.time,
            self.content_id.clone(),
        )
    }

    /// Ordering key for serialization: (date, time, name, id) with unknown
    /// date/time sorted last.
    pub fn sort_key(&self) -> (DayMonth, ClockTime, String, String) {
        (
            self.date.unwrap_or(DayMonth {
                month: u8::MAX,
                day: u8::MAX,
            }),
            self.time.unwrap_or(ClockTime {
                hour: u8::MAX,
                minute: u8::MAX,
            }),
            self.name.clone(),
            self.content_id.clone(),
        )
    }
}

/// Drop records whose uniqueness key was already seen, preserving
/// first-seen order. Pure and idempotent.
pub fn dedup_records(records: Vec<EventRecord>) -> Vec<EventRecord> {
    records.into_iter().unique_by(|r| r.key()).collect()
}
