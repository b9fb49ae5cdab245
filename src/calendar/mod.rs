//! iCalendar export of the wedding events a guest confirmed.
//!
//! Purely a function of which events were selected; nothing here talks
//! to the network.

use chrono::{DateTime, Utc};
use thiserror::Error;

const PRODID: &str = "-//Boda Natalia & Jan//RSVP//ES";
const TZID: &str = "America/Argentina/Buenos_Aires";
const UID_DOMAIN: &str = "boda-natalia-jan";
const MAX_LINE_OCTETS: usize = 75;

/// Both events happen on 7 October 2025
const WEDDING_DAY: &str = "20251007";

/// Wall clock time at the venue on the wedding day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub hour: u8,
    pub minute: u8,
}

impl LocalTime {
    const fn at(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// iCalendar local date-time, meant to be paired with a TZID
    fn to_ical(self) -> String {
        format!("{}T{:02}{:02}00", WEDDING_DAY, self.hour, self.minute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Civil,
    Lunch,
}

impl EventKind {
    fn slug(&self) -> &'static str {
        match self {
            EventKind::Civil => "civil",
            EventKind::Lunch => "celebracion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub kind: EventKind,
    pub summary: &'static str,
    pub description: &'static str,
    pub location: &'static str,
    pub start: LocalTime,
    pub end: LocalTime,
}

pub const CIVIL_CEREMONY: CalendarEvent = CalendarEvent {
    kind: EventKind::Civil,
    summary: "Ceremonia Civil - Boda Natalia & Jan",
    description: "Ceremonia civil de Natalia y Jan.\nPor favor llegar 15 minutos antes de la ceremonia.",
    location: "Subsede Comunal 11, Buenos Aires, Argentina",
    start: LocalTime::at(12, 30),
    end: LocalTime::at(13, 30),
};

pub const LUNCH_CELEBRATION: CalendarEvent = CalendarEvent {
    kind: EventKind::Lunch,
    summary: "Celebración - Boda Natalia & Jan",
    description: "Almuerzo de celebración de la boda de Natalia y Jan.",
    location: "Salón Los Jardines, Buenos Aires, Argentina",
    start: LocalTime::at(14, 0),
    end: LocalTime::at(18, 0),
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("No hay eventos seleccionados")]
    NoEventsSelected,
}

/// A ready to download .ics file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarFile {
    pub file_name: &'static str,
    pub content: String,
}

impl CalendarFile {
    pub const CONTENT_TYPE: &'static str = "text/calendar; charset=utf-8";
}

pub fn selected_events(attend_civil: bool, attend_lunch: bool) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    if attend_civil {
        events.push(CIVIL_CEREMONY);
    }
    if attend_lunch {
        events.push(LUNCH_CELEBRATION);
    }
    events
}

/// Build one calendar file holding every selected event.
pub fn export(
    attend_civil: bool,
    attend_lunch: bool,
    now: DateTime<Utc>,
) -> Result<CalendarFile, CalendarError> {
    let events = selected_events(attend_civil, attend_lunch);
    let file_name = match (attend_civil, attend_lunch) {
        (true, true) => "boda-natalia-jan.ics",
        (true, false) => "boda-civil.ics",
        (false, true) => "boda-celebracion.ics",
        (false, false) => return Err(CalendarError::NoEventsSelected),
    };

    Ok(CalendarFile {
        file_name,
        content: render(&events, now),
    })
}

fn render(events: &[CalendarEvent], now: DateTime<Utc>) -> String {
    let stamp = now.format("%Y%m%dT%H%M%SZ").to_string();
    let millis = now.timestamp_millis();

    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".into(),
        "VERSION:2.0".into(),
        format!("PRODID:{}", PRODID),
        "CALSCALE:GREGORIAN".into(),
        "METHOD:PUBLISH".into(),
        // Argentina has had no daylight saving time since 2009
        "BEGIN:VTIMEZONE".into(),
        format!("TZID:{}", TZID),
        "BEGIN:STANDARD".into(),
        "DTSTART:19700101T000000".into(),
        "TZOFFSETFROM:-0300".into(),
        "TZOFFSETTO:-0300".into(),
        "TZNAME:-03".into(),
        "END:STANDARD".into(),
        "END:VTIMEZONE".into(),
    ];

    for event in events {
        lines.extend([
            "BEGIN:VEVENT".into(),
            format!("UID:{}-{}@{}", event.kind.slug(), millis, UID_DOMAIN),
            format!("DTSTAMP:{}", stamp),
            format!("DTSTART;TZID={}:{}", TZID, event.start.to_ical()),
            format!("DTEND;TZID={}:{}", TZID, event.end.to_ical()),
            format!("SUMMARY:{}", escape_text(event.summary)),
            format!("DESCRIPTION:{}", escape_text(event.description)),
            format!("LOCATION:{}", escape_text(event.location)),
            "STATUS:CONFIRMED".into(),
            "BEGIN:VALARM".into(),
            "TRIGGER:-P1D".into(),
            "ACTION:DISPLAY".into(),
            format!("DESCRIPTION:{}", escape_text(&format!("Mañana: {}", event.summary))),
            "END:VALARM".into(),
            "END:VEVENT".into(),
        ]);
    }
    lines.push("END:VCALENDAR".into());

    lines.iter().map(|line| fold_line(line) + "\r\n").collect()
}

fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

/// Fold content lines longer than 75 octets, never splitting a UTF-8
/// sequence. Continuation lines start with a single space.
fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }
    let mut folded = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            folded.push_str("\r\n ");
            // The leading space counts towards the continuation line
            width = 1;
        }
        folded.push(c);
        width += len;
    }
    folded
}
