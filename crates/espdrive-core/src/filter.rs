// ── Client-side history filters ──

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{CommandKind, EventRecord, parse_command};

/// Which commands to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandFilter {
    #[default]
    All,
    Only(CommandKind),
}

impl CommandFilter {
    pub fn matches(self, record: &EventRecord) -> bool {
        match self {
            Self::All => true,
            Self::Only(kind) => record.is_command(kind),
        }
    }
}

impl FromStr for CommandFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            parse_command(s).map(Self::Only)
        }
    }
}

impl fmt::Display for CommandFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(kind) => write!(f, "{kind}"),
        }
    }
}

/// Which days to keep, relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateRange {
    /// No date restriction. Parsed from `none` or `all`.
    #[default]
    All,
    Today,
    Yesterday,
    /// Sliding window: the last 7 days up to now.
    LastWeek,
    /// Sliding window: the last 30 days up to now.
    LastMonth,
    /// One specific calendar day.
    On(NaiveDate),
}

impl DateRange {
    /// Whether `record` falls inside this range, evaluated at `now`.
    ///
    /// Records without a timestamp only pass [`DateRange::All`].
    pub fn contains_at<Tz: TimeZone>(self, record: &EventRecord, now: &DateTime<Tz>) -> bool {
        if self == Self::All {
            return true;
        }
        let Some(ts) = record.timestamp else {
            return false;
        };

        let tz = now.timezone();
        let local_day = ts.with_timezone(&tz).date_naive();
        let today = now.date_naive();

        match self {
            Self::All => true,
            Self::Today => local_day == today,
            Self::Yesterday => today.checked_sub_signed(TimeDelta::days(1)) == Some(local_day),
            Self::LastWeek => within(ts, now, TimeDelta::days(7)),
            Self::LastMonth => within(ts, now, TimeDelta::days(30)),
            Self::On(day) => local_day == day,
        }
    }
}

fn within<Tz: TimeZone>(ts: DateTime<Utc>, now: &DateTime<Tz>, window: TimeDelta) -> bool {
    let now = now.with_timezone(&Utc);
    ts <= now && ts >= now - window
}

impl FromStr for DateRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "none" | "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "yesterday" => Ok(Self::Yesterday),
            "last-week" | "week" => Ok(Self::LastWeek),
            "last-month" | "month" => Ok(Self::LastMonth),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map(Self::On)
                .map_err(|_| CoreError::ValidationFailed {
                    message: format!(
                        "unknown date range '{s}' (expected none, today, yesterday, last-week, last-month or YYYY-MM-DD)"
                    ),
                }),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("none"),
            Self::Today => f.write_str("today"),
            Self::Yesterday => f.write_str("yesterday"),
            Self::LastWeek => f.write_str("last-week"),
            Self::LastMonth => f.write_str("last-month"),
            Self::On(day) => write!(f, "{}", day.format("%Y-%m-%d")),
        }
    }
}

/// Command and date predicates, ANDed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventFilter {
    pub command: CommandFilter,
    pub range: DateRange,
}

impl EventFilter {
    pub fn new(command: CommandFilter, range: DateRange) -> Self {
        Self { command, range }
    }

    pub fn matches_at<Tz: TimeZone>(&self, record: &EventRecord, now: &DateTime<Tz>) -> bool {
        self.command.matches(record) && self.range.contains_at(record, now)
    }

    /// Keep the records matching both predicates at `now`, in input order.
    pub fn apply_at<Tz: TimeZone>(&self, records: Vec<EventRecord>, now: &DateTime<Tz>) -> Vec<EventRecord> {
        records
            .into_iter()
            .filter(|r| self.matches_at(r, now))
            .collect()
    }

    /// [`apply_at`](Self::apply_at) against the local clock.
    pub fn apply(&self, records: Vec<EventRecord>) -> Vec<EventRecord> {
        self.apply_at(records, &Local::now())
    }
}

/// Free-function form of [`EventFilter::apply`].
pub fn filter(records: Vec<EventRecord>, command: CommandFilter, range: DateRange) -> Vec<EventRecord> {
    EventFilter::new(command, range).apply(records)
}
