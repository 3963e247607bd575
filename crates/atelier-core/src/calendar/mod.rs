//! iCalendar (RFC 5545) export of a plan's schedule.
//!
//! Output is a single `VCALENDAR` with one `VEVENT` per event, lines joined
//! by CRLF, no trailing line break. Times are floating local times.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use thiserror::Error;

use crate::model::CalendarEvent;

/// `PRODID` written into every calendar.
pub const PRODID: &str = "-//AtelierChef//NONSGML Event Calendar//EN";

const STAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// How `DTEND` is derived for each event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DtEnd {
    /// Start plus `durationMinutes`, rolling into the next day if needed.
    #[default]
    ApplyDuration,
    /// Identical to `DTSTART`. Text fields are escaped in both modes.
    SameAsStart,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("event {event_id}: invalid date {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { event_id: String, value: String },

    #[error("event {event_id}: invalid start time {value:?} (expected HH:MM)")]
    InvalidTime { event_id: String, value: String },
}

/// Escape a TEXT value per RFC 5545 section 3.3.11.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

fn event_start(event: &CalendarEvent) -> Result<NaiveDateTime, CalendarError> {
    let date = NaiveDate::parse_from_str(event.date.trim(), "%Y-%m-%d").map_err(|_| {
        CalendarError::InvalidDate {
            event_id: event.id.clone(),
            value: event.date.clone(),
        }
    })?;
    let time = NaiveTime::parse_from_str(event.start_time.trim(), "%H:%M").map_err(|_| {
        CalendarError::InvalidTime {
            event_id: event.id.clone(),
            value: event.start_time.clone(),
        }
    })?;
    Ok(date.and_time(time))
}

/// Render events as an iCalendar document.
///
/// Fails on the first event whose date or start time does not parse; no
/// partial document is returned.
pub fn generate_ics(events: &[CalendarEvent], end: DtEnd) -> Result<String, CalendarError> {
    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".into(),
        "VERSION:2.0".into(),
        format!("PRODID:{PRODID}"),
    ];

    for event in events {
        let start = event_start(event)?;
        let finish = match end {
            DtEnd::ApplyDuration => {
                start + TimeDelta::minutes(i64::from(event.duration_minutes))
            }
            DtEnd::SameAsStart => start,
        };

        lines.push("BEGIN:VEVENT".into());
        lines.push(format!("SUMMARY:{}", escape_text(&event.title)));
        lines.push(format!("DESCRIPTION:{}", escape_text(&event.description)));
        lines.push(format!("DTSTART:{}", start.format(STAMP_FORMAT)));
        lines.push(format!("DTEND:{}", finish.format(STAMP_FORMAT)));
        lines.push("END:VEVENT".into());
    }

    lines.push("END:VCALENDAR".into());
    Ok(lines.join("\r\n"))
}

/// Suggested file name for a plan's calendar export.
pub fn export_filename(plan_id: &str) -> String {
    format!("atelier-plan-{plan_id}.ics")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventType;

    fn sunlight() -> CalendarEvent {
        CalendarEvent {
            id: "s-h-0".into(),
            title: "Sunlight Ritual".into(),
            description: "10 mins outdoor hydration".into(),
            start_time: "07:30".into(),
            duration_minutes: 10,
            event_type: EventType::Hydration,
            date: "2026-01-17".into(),
        }
    }

    #[test]
    fn single_event_document() {
        let ics = generate_ics(&[sunlight()], DtEnd::ApplyDuration).unwrap();
        assert_eq!(
            ics,
            "BEGIN:VCALENDAR\r\n\
             VERSION:2.0\r\n\
             PRODID:-//AtelierChef//NONSGML Event Calendar//EN\r\n\
             BEGIN:VEVENT\r\n\
             SUMMARY:Sunlight Ritual\r\n\
             DESCRIPTION:10 mins outdoor hydration\r\n\
             DTSTART:20260117T073000\r\n\
             DTEND:20260117T074000\r\n\
             END:VEVENT\r\n\
             END:VCALENDAR"
        );
    }

    #[test]
    fn same_as_start_repeats_dtstart() {
        let ics = generate_ics(&[sunlight()], DtEnd::SameAsStart).unwrap();
        assert!(ics.contains("DTSTART:20260117T073000\r\nDTEND:20260117T073000"));
    }

    #[test]
    fn duration_rolls_past_midnight() {
        let mut late = sunlight();
        late.start_time = "23:50".into();
        late.duration_minutes = 30;
        let ics = generate_ics(&[late], DtEnd::ApplyDuration).unwrap();
        assert!(ics.contains("DTEND:20260118T002000"));
    }

    #[test]
    fn empty_schedule_still_wraps() {
        let ics = generate_ics(&[], DtEnd::default()).unwrap();
        assert_eq!(
            ics,
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//AtelierChef//NONSGML Event Calendar//EN\r\nEND:VCALENDAR"
        );
    }

    #[test]
    fn text_fields_are_escaped() {
        let mut event = sunlight();
        event.title = "Prep; chop, rinse".into();
        event.description = "line one\nC:\\path".into();
        let ics = generate_ics(&[event], DtEnd::default()).unwrap();
        assert!(ics.contains("SUMMARY:Prep\\; chop\\, rinse\r\n"));
        assert!(ics.contains("DESCRIPTION:line one\\nC:\\\\path\r\n"));
    }

    #[test]
    fn same_as_start_still_escapes_text() {
        let mut event = sunlight();
        event.title = "Soak; rinse, drain".into();
        let ics = generate_ics(&[event], DtEnd::SameAsStart).unwrap();
        assert!(ics.contains("SUMMARY:Soak\\; rinse\\, drain\r\n"));
    }

    #[test]
    fn bad_inputs_name_the_event() {
        let mut event = sunlight();
        event.date = "17/01/2026".into();
        assert_eq!(
            generate_ics(&[event], DtEnd::default()).unwrap_err(),
            CalendarError::InvalidDate {
                event_id: "s-h-0".into(),
                value: "17/01/2026".into(),
            }
        );

        let mut event = sunlight();
        event.start_time = "7.30am".into();
        assert!(matches!(
            generate_ics(&[event], DtEnd::default()),
            Err(CalendarError::InvalidTime { .. })
        ));
    }

    #[test]
    fn filename_uses_plan_id() {
        assert_eq!(
            export_filename("atelier-eval-deterministic"),
            "atelier-plan-atelier-eval-deterministic.ics"
        );
    }
}
