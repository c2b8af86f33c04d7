// ── Day grouping for event history ──

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone};

use crate::model::{EventGroup, EventRecord, GroupKey};

pub const TODAY_LABEL: &str = "Today";
pub const YESTERDAY_LABEL: &str = "Yesterday";
pub const UNKNOWN_DATE_LABEL: &str = "Unknown date";

/// Group by local calendar day, relative to the current local time.
pub fn group(records: Vec<EventRecord>) -> Vec<EventGroup> {
    group_at(records, &Local::now())
}

/// Group records by calendar day in `now`'s timezone.
///
/// Days are sorted newest first and the unknown-date bucket, if any, comes
/// last. Records keep their input order inside a group. Every record lands
/// in exactly one group.
pub fn group_at<Tz: TimeZone>(records: Vec<EventRecord>, now: &DateTime<Tz>) -> Vec<EventGroup> {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut days: BTreeMap<NaiveDate, Vec<EventRecord>> = BTreeMap::new();
    let mut unknown = Vec::new();

    for record in records {
        match record.timestamp {
            Some(ts) => days
                .entry(ts.with_timezone(&tz).date_naive())
                .or_default()
                .push(record),
            None => unknown.push(record),
        }
    }

    let mut groups: Vec<EventGroup> = days
        .into_iter()
        .rev()
        .map(|(day, records)| EventGroup {
            key: GroupKey::Day(day),
            label: day_label(day, today),
            records,
        })
        .collect();

    if !unknown.is_empty() {
        groups.push(EventGroup {
            key: GroupKey::UnknownDate,
            label: UNKNOWN_DATE_LABEL.to_owned(),
            records: unknown,
        });
    }

    groups
}

/// "Today", "Yesterday", or e.g. "Monday, 06/01/2025".
pub fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        TODAY_LABEL.to_owned()
    } else if today.checked_sub_signed(TimeDelta::days(1)) == Some(day) {
        YESTERDAY_LABEL.to_owned()
    } else {
        day.format("%A, %d/%m/%Y").to_string()
    }
}

/// Distinct local days present in `records`, newest first.
pub fn available_days(records: &[EventRecord]) -> Vec<NaiveDate> {
    available_days_in(records, &Local)
}

pub fn available_days_in<Tz: TimeZone>(records: &[EventRecord], tz: &Tz) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = records
        .iter()
        .filter_map(|r| r.timestamp)
        .map(|ts| ts.with_timezone(tz).date_naive())
        .collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();
    days
}
