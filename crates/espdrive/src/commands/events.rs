//! `events`: list, group, and summarize the command history.

use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tabled::Tabled;

use espdrive_core::group::{self, day_label};
use espdrive_core::{CommandFilter, DateRange, EventFilter, EventGroup, EventRecord, Session};

use crate::cli::{EventFilterArgs, EventsArgs, EventsCommand, GlobalOpts, OutputFormat, RangeArg};
use crate::error::CliError;
use crate::output;

// ── Filter construction ─────────────────────────────────────────────

impl From<RangeArg> for DateRange {
    fn from(arg: RangeArg) -> Self {
        match arg {
            RangeArg::None => Self::All,
            RangeArg::Today => Self::Today,
            RangeArg::Yesterday => Self::Yesterday,
            RangeArg::LastWeek => Self::LastWeek,
            RangeArg::LastMonth => Self::LastMonth,
        }
    }
}

fn build_filter(args: &EventFilterArgs) -> Result<EventFilter, CliError> {
    let command = match args.command.as_deref() {
        Some(raw) => CommandFilter::from_str(raw)?,
        None => CommandFilter::All,
    };
    let range = match args.on.as_deref() {
        Some(raw) => match DateRange::from_str(raw)? {
            day @ DateRange::On(_) => day,
            _ => {
                return Err(CliError::Validation {
                    field: "on".into(),
                    reason: format!("'{raw}' is not a YYYY-MM-DD date"),
                });
            }
        },
        None => args.range.into(),
    };
    Ok(EventFilter::new(command, range))
}

/// Fetch, filter, and cap the history.
async fn load(session: &Session, args: &EventFilterArgs) -> Result<Vec<EventRecord>, CliError> {
    let filter = build_filter(args)?;
    let mut records = filter.apply(session.fetch_events().await?);
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }
    tracing::debug!(count = records.len(), command = %filter.command, range = %filter.range, "events loaded");
    Ok(records)
}

// ── Row helpers ─────────────────────────────────────────────────────

fn command_text(record: &EventRecord) -> String {
    match record.kind {
        Some(kind) => format!("{} {}", kind.arrow(), kind.label()),
        None => record.command.clone(),
    }
}

fn local_time(record: &EventRecord, fmt: &str) -> String {
    record.timestamp.map_or_else(
        || "unknown".to_owned(),
        |ts| ts.with_timezone(&Local).format(fmt).to_string(),
    )
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Command")]
    command: String,
    #[tabled(rename = "Time")]
    time: String,
}

fn to_row(record: &EventRecord) -> EventRow {
    EventRow {
        id: record.id.clone(),
        command: command_text(record),
        time: local_time(record, "%Y-%m-%d %H:%M:%S"),
    }
}

fn plain_line(record: &EventRecord) -> String {
    format!(
        "{}\t{}\t{}",
        record.id,
        record.command,
        record
            .timestamp
            .map_or_else(|| "unknown".to_owned(), |ts| ts.to_rfc3339())
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: EventsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        EventsCommand::List(filter) => list(session, &filter, global).await,
        EventsCommand::Grouped(filter) => grouped(session, &filter, global).await,
        EventsCommand::Days(filter) => days(session, &filter, global).await,
    }
}

async fn list(session: &Session, args: &EventFilterArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let records = load(session, args).await?;
    let out = output::render_list(global.output_format(), &records, to_row, plain_line)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_groups(groups: &[EventGroup], color: bool) -> String {
    let total: usize = groups.iter().map(EventGroup::len).sum();
    let mut sections = Vec::with_capacity(groups.len() + 1);
    for g in groups {
        let rows: Vec<EventRow> = g
            .records
            .iter()
            .map(|r| EventRow {
                time: local_time(r, "%H:%M:%S"),
                ..to_row(r)
            })
            .collect();
        sections.push(format!(
            "{} {}\n{}",
            g.label,
            output::dim(&format!("({} events)", g.len()), color),
            output::render_table(&rows)
        ));
    }
    sections.push(format!("Total: {total} events"));
    sections.join("\n\n")
}

async fn grouped(session: &Session, args: &EventFilterArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let groups = group::group(load(session, args).await?);
    let color = output::should_color(global.color_mode());

    let out = match global.output_format() {
        OutputFormat::Table => {
            if groups.is_empty() {
                "No events".to_owned()
            } else {
                render_groups(&groups, color)
            }
        }
        OutputFormat::Json => output::render_json_pretty(&groups)?,
        OutputFormat::JsonCompact => output::render_json_compact(&groups)?,
        OutputFormat::Yaml => output::render_yaml(&groups)?,
        OutputFormat::Plain => groups
            .iter()
            .map(|g| format!("{}\t{}", g.label, g.len()))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

#[derive(Serialize)]
struct DaySummary {
    date: NaiveDate,
    label: String,
    events: usize,
}

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Day")]
    label: String,
    #[tabled(rename = "Events")]
    events: usize,
}

async fn days(session: &Session, args: &EventFilterArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let records = load(session, args).await?;
    let today = Local::now().date_naive();

    let summaries: Vec<DaySummary> = group::available_days(&records)
        .into_iter()
        .map(|date| DaySummary {
            date,
            label: day_label(date, today),
            events: records
                .iter()
                .filter_map(|r| r.timestamp)
                .filter(|ts| ts.with_timezone(&Local).date_naive() == date)
                .count(),
        })
        .collect();

    let out = output::render_list(
        global.output_format(),
        &summaries,
        |d| DayRow {
            date: d.date.format("%Y-%m-%d").to_string(),
            label: d.label.clone(),
            events: d.events,
        },
        |d| format!("{}\t{}", d.date.format("%Y-%m-%d"), d.events),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
