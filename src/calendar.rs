//! ICS assembly: one VEVENT per screening.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, CalendarDateTime, Component, Event, EventLike, Property};

use crate::model::Film;

pub const CALENDAR_NAME: &str = "Cambridge Film Festival";
pub const PRODUCT_ID: &str = "-//cff_calendar//Cambridge Film Festival//EN";
pub const LOCATION: &str = "Arts Picturehouse, 38-39 St Andrew's St, Cambridge CB2 3AR";

/// Minutes added after the (rounded) run time for trailers and egress.
const PADDING_MINUTES: u32 = 15;
const RUNTIME_STEP: u32 = 5;

/// Round `value` up to the next multiple of `step`.
pub fn round_up(value: u32, step: u32) -> u32 {
    (value + step - 1) / step * step
}

pub fn event_end(start: &DateTime<Tz>, runtime: u32) -> DateTime<Tz> {
    let minutes = PADDING_MINUTES + round_up(runtime, RUNTIME_STEP);
    *start + Duration::minutes(i64::from(minutes))
}

/// Description for the `index`th screening of `film`.
pub fn describe(film: &Film, index: usize) -> String {
    let screening = &film.screenings[index];
    let mut parts = vec![
        format!(
            "Duration: {} mins ({}h{:02}m), Screen {}",
            film.runtime,
            film.runtime / 60,
            film.runtime % 60,
            screening.screen
        ),
        film.synopsis.clone(),
    ];

    if film.screenings.len() > 1 {
        let others: Vec<String> = film
            .screenings
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, s)| format!("{}, Screen {}", s.start.format("%a %-d %b, %-I:%M %p"), s.screen))
            .collect();
        parts.push(format!("Also playing on:\n{}", others.join("\n")));
    }

    parts.push(film.url.clone());
    parts.push(screening.url.clone());
    parts.join("\n\n")
}

fn local(dt: &DateTime<Tz>) -> CalendarDateTime {
    CalendarDateTime::WithTimezone {
        date_time: dt.naive_local(),
        tzid: dt.timezone().name().to_string(),
    }
}

pub fn build_calendar(films: &[Film], now: DateTime<Utc>) -> Calendar {
    let stamp = now.format("%Y%m%dT%H%M%SZ").to_string();

    let mut calendar = Calendar::new();
    calendar.append_property(Property::new("NAME", CALENDAR_NAME));
    calendar.append_property(Property::new("X-WR-CALNAME", CALENDAR_NAME));
    calendar.append_property(Property::new("LAST-MODIFIED", &stamp));

    for film in films {
        for (i, screening) in film.screenings.iter().enumerate() {
            let end = event_end(&screening.start, film.runtime);
            let event = Event::new()
                .uid(&screening.session_id)
                .summary(&film.title)
                .location(LOCATION)
                .timestamp(now)
                .starts(local(&screening.start))
                .ends(local(&end))
                .description(&describe(film, i))
                .done();
            calendar.push(event);
        }
    }

    calendar.done()
}

/// Serialised calendar, with our own PRODID in place of the library's.
pub fn render(films: &[Film], now: DateTime<Utc>) -> String {
    let ics = build_calendar(films, now).to_string();
    let mut out = String::with_capacity(ics.len());
    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            out.push_str("PRODID:");
            out.push_str(PRODUCT_ID);
        } else {
            out.push_str(line);
        }
        out.push_str("\r\n");
    }
    out
}
