// ── Event payload normalization ──
//
// The events service has shipped three envelope shapes over time. Each
// is a `PayloadShape`; `EXTRACTION_ORDER` is tried front to back and the
// first shape that yields an array wins. Nothing in here returns an
// error: an unrecognised body becomes an empty history.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::EventRecord;

const ID_FIELD: &str = "id";
const COMMAND_FIELD: &str = "posicion";
const TIMESTAMP_FIELD: &str = "timestamp";

/// Epoch numbers with a larger magnitude are taken as milliseconds.
const EPOCH_MILLIS_THRESHOLD: u64 = 1_000_000_000_000;

/// How far back to look for the offset in force before a DST gap.
const DST_GAP_LOOKBACK_HOURS: i64 = 3;

/// A known envelope for the event list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `[ {...}, ... ]`
    BareArray,
    /// `{ "data": [ ... ] }`
    DataField,
    /// `{ "eventos": [ ... ] }`
    EventosField,
}

pub const EXTRACTION_ORDER: [PayloadShape; 3] = [
    PayloadShape::BareArray,
    PayloadShape::DataField,
    PayloadShape::EventosField,
];

impl PayloadShape {
    /// The event array if `value` has this shape.
    pub fn extract(self, value: &Value) -> Option<&Vec<Value>> {
        match self {
            Self::BareArray => value.as_array(),
            Self::DataField => value.get("data")?.as_array(),
            Self::EventosField => value.get("eventos")?.as_array(),
        }
    }
}

/// Normalize a decoded JSON body into records, reading naive timestamps
/// as local time.
pub fn normalize(value: &Value) -> Vec<EventRecord> {
    normalize_in(value, &Local)
}

/// Same as [`normalize`], but naive timestamps are read in `tz`.
pub fn normalize_in<Tz: TimeZone>(value: &Value, tz: &Tz) -> Vec<EventRecord> {
    let Some((shape, items)) = EXTRACTION_ORDER
        .iter()
        .find_map(|shape| shape.extract(value).map(|items| (*shape, items)))
    else {
        warn!(keys = %top_level_keys(value), "unrecognised events payload, treating as empty");
        return Vec::new();
    };

    debug!(?shape, count = items.len(), "extracted events");
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let record = record_from(item, tz);
            if record.is_none() {
                debug!(index, "skipping non-object event entry");
            }
            record
        })
        .collect()
}

/// Decode and normalize a raw body. Malformed JSON yields no records.
pub fn normalize_str(body: &str) -> Vec<EventRecord> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => normalize(&value),
        Err(e) => {
            warn!(error = %e, "events body is not valid JSON, treating as empty");
            Vec::new()
        }
    }
}

fn record_from<Tz: TimeZone>(item: &Value, tz: &Tz) -> Option<EventRecord> {
    let obj = item.as_object()?;

    let id = match obj.get(ID_FIELD) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let command = obj
        .get(COMMAND_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default();
    let timestamp = obj
        .get(TIMESTAMP_FIELD)
        .and_then(|v| timestamp_from_value(v, tz));

    Some(EventRecord::new(id, command, timestamp))
}

fn timestamp_from_value<Tz: TimeZone>(value: &Value, tz: &Tz) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_in(s, tz),
        Value::Number(n) => {
            let n = n.as_i64()?;
            if n.unsigned_abs() > EPOCH_MILLIS_THRESHOLD {
                DateTime::from_timestamp_millis(n)
            } else {
                DateTime::from_timestamp(n, 0)
            }
        }
        _ => None,
    }
}

/// Lenient timestamp parse.
///
/// Tries RFC 3339, then `YYYY-MM-DD HH:MM:SS[.fff]` (space or `T`
/// separated) in `tz`, then a bare `YYYY-MM-DD` at midnight in `tz`,
/// then RFC 2822.
pub fn parse_timestamp_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });
    if let Some(naive) = naive {
        return local_to_utc(naive, tz);
    }

    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Pin a wall-clock time in `tz`. Ambiguous times take the earlier
/// instant; times inside a spring-forward gap use the offset in force just
/// before the gap.
fn local_to_utc<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Some(dt.with_timezone(&Utc));
    }
    let before = naive.checked_sub_signed(TimeDelta::hours(DST_GAP_LOOKBACK_HOURS))?;
    let offset = tz.offset_from_local_datetime(&before).earliest()?.fix();
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn top_level_keys(value: &Value) -> String {
    match value {
        Value::Object(map) => map.keys().cloned().collect::<Vec<_>>().join(", "),
        Value::Null => "<null>".into(),
        Value::Bool(_) => "<bool>".into(),
        Value::Number(_) => "<number>".into(),
        Value::String(_) => "<string>".into(),
        Value::Array(_) => "<array>".into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::CommandKind;
    use chrono::{Datelike, FixedOffset, LocalResult, Timelike};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_events() -> Value {
        json!([
            { "id": "1", "posicion": "adelante", "timestamp": "2025-01-06T09:30:00Z" },
            { "id": 2, "posicion": "STOP", "timestamp": "2025-01-06 10:00:00" },
            { "id": "3", "posicion": "turbo", "timestamp": "not a date" },
        ])
    }

    #[test]
    fn all_known_shapes_normalize_identically() {
        let bare = normalize_in(&sample_events(), &Utc);
        let data = normalize_in(&json!({ "data": sample_events() }), &Utc);
        let eventos = normalize_in(&json!({ "eventos": sample_events(), "total": 3 }), &Utc);

        assert_eq!(bare.len(), 3);
        assert_eq!(bare, data);
        assert_eq!(bare, eventos);
    }

    #[test]
    fn unknown_shape_is_empty() {
        assert!(normalize(&json!({ "unexpected": 1 })).is_empty());
        assert!(normalize(&json!("hello")).is_empty());
        assert!(normalize(&json!({ "data": "not an array" })).is_empty());
    }

    #[test]
    fn malformed_json_is_empty() {
        assert!(normalize_str("<html>502 Bad Gateway</html>").is_empty());
        assert!(normalize_str("").is_empty());
    }

    #[test]
    fn maps_fields() {
        let records = normalize_in(&sample_events(), &Utc);

        assert_eq!(records[0].id, "1");
        assert_eq!(records[0].kind, Some(CommandKind::Forward));

        assert_eq!(records[1].id, "2");
        assert_eq!(records[1].command, "STOP");
        assert_eq!(records[1].kind, Some(CommandKind::Stop));
        let ts = records[1].timestamp.map(|t| (t.hour(), t.minute()));
        assert_eq!(ts, Some((10, 0)));

        assert_eq!(records[2].command, "turbo");
        assert_eq!(records[2].kind, None);
        assert_eq!(records[2].timestamp, None);
    }

    #[test]
    fn skips_non_objects_and_fills_missing_fields() {
        let records = normalize_in(&json!([null, 42, "x", {}]), &Utc);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "");
        assert_eq!(records[0].command, "");
        assert_eq!(records[0].kind, None);
        assert_eq!(records[0].timestamp, None);
    }

    #[test]
    fn normalizing_is_idempotent() {
        let body = sample_events().to_string();
        assert_eq!(normalize_str(&body), normalize_str(&body));
    }

    #[test]
    fn parses_timestamp_variants() {
        let rfc = parse_timestamp_in("2025-03-01T12:00:00+02:00", &Utc).map(|t| t.hour());
        assert_eq!(rfc, Some(10));

        let bare_date = parse_timestamp_in("2025-03-01", &Utc).map(|t| (t.day(), t.hour()));
        assert_eq!(bare_date, Some((1, 0)));

        let fractional = parse_timestamp_in("2025-03-01 08:15:30.250", &Utc).map(|t| t.second());
        assert_eq!(fractional, Some(30));

        assert_eq!(parse_timestamp_in("yesterday", &Utc), None);
        assert_eq!(parse_timestamp_in("  ", &Utc), None);
    }

    #[test]
    fn epoch_numbers_accept_seconds_and_millis() {
        let secs = normalize_in(&json!([{ "timestamp": 1_736_160_000 }]), &Utc);
        let millis = normalize_in(&json!([{ "timestamp": 1_736_160_000_000_i64 }]), &Utc);
        assert!(secs[0].timestamp.is_some());
        assert_eq!(secs[0].timestamp, millis[0].timestamp);

        let negative_millis = normalize_in(&json!([{ "timestamp": -1_000_000_000_001_i64 }]), &Utc);
        assert!(negative_millis[0].timestamp.is_some());

        let extremes = normalize_str(&format!(
            r#"[{{"id":1,"posicion":"stop","timestamp":{}}},{{"id":2,"timestamp":{}}}]"#,
            i64::MIN,
            i64::MAX
        ));
        assert_eq!(extremes.len(), 2);
        assert_eq!(extremes[0].kind, Some(CommandKind::Stop));
        assert_eq!(extremes[0].timestamp, None);
        assert_eq!(extremes[1].timestamp, None);
    }

    /// UTC+1, switching to UTC+2 at 02:00 local on 2025-03-30, leaving a
    /// one-hour hole in wall-clock time.
    #[derive(Debug, Clone, Copy)]
    struct SpringForward;

    impl SpringForward {
        fn gap() -> (NaiveDateTime, NaiveDateTime) {
            let day = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
            (day.and_hms_opt(2, 0, 0).unwrap(), day.and_hms_opt(3, 0, 0).unwrap())
        }

        fn winter() -> FixedOffset {
            FixedOffset::east_opt(3600).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::east_opt(7200).unwrap()
        }
    }

    impl TimeZone for SpringForward {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            Self
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let (start, end) = Self::gap();
            if *local < start {
                LocalResult::Single(Self::winter())
            } else if *local < end {
                LocalResult::None
            } else {
                LocalResult::Single(Self::summer())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            let (start, _) = Self::gap();
            if *utc < start - TimeDelta::hours(1) {
                Self::winter()
            } else {
                Self::summer()
            }
        }
    }

    #[test]
    fn wall_clock_inside_dst_gap_keeps_its_date() {
        let in_gap = parse_timestamp_in("2025-03-30 02:30:00", &SpringForward);
        assert_eq!(in_gap, Some(Utc.with_ymd_and_hms(2025, 3, 30, 1, 30, 0).unwrap()));

        let after = parse_timestamp_in("2025-03-30 04:00:00", &SpringForward);
        assert_eq!(after, Some(Utc.with_ymd_and_hms(2025, 3, 30, 2, 0, 0).unwrap()));

        let records = normalize_in(
            &json!([{ "id": 9, "posicion": "atras", "timestamp": "2025-03-30 02:15:00" }]),
            &SpringForward,
        );
        assert!(records[0].timestamp.is_some());
    }
}
