//! Free-form showtime strings ("Showing on Thursday 19th October 2023, 8:20pm")
//! into local timestamps.
//!
//! Source times are taken to be already expressed in Europe/London: the zone
//! is attached to the parsed wall-clock time, never converted into it.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Europe::London;
use chrono_tz::Tz;
use regex::Regex;

use crate::error::{Result, ScrapeError};

static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap());
static MERIDIEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d)\s*([ap])\.?m\.?(\W|$)").unwrap());
static AT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bat\b").unwrap());
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{4}\b").unwrap());

const DATE_LAYOUTS: &[&str] = &["%A %d %B", "%d %B", "%A %B %d", "%B %d"];
const TIME_LAYOUTS: &[&str] = &["%H:%M", "%I:%M %p", "%I %p"];

/// Parse a showtime, filling in `default_year` when the text has none.
pub fn parse_showtime(text: &str, default_year: i32) -> Result<NaiveDateTime> {
    let cleaned = normalise(text);
    let has_year = YEAR_RE.is_match(&cleaned);
    let candidate = if has_year {
        cleaned.clone()
    } else {
        format!("{} {}", cleaned, default_year)
    };

    for date in DATE_LAYOUTS {
        for time in TIME_LAYOUTS {
            let layout = if has_year {
                format!("{} %Y {}", date, time)
            } else {
                format!("{} {} %Y", date, time)
            };
            if let Ok(parsed) = NaiveDateTime::parse_from_str(&candidate, &layout) {
                return Ok(parsed);
            }
        }
    }

    Err(ScrapeError::InvalidShowtime {
        text: text.to_string(),
    })
}

/// Attach Europe/London to a wall-clock time. An ambiguous time (clocks
/// going back) resolves to the earlier instant; a skipped one is an error.
pub fn localise(naive: NaiveDateTime) -> Result<DateTime<Tz>> {
    London
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| ScrapeError::InvalidShowtime {
            text: naive.to_string(),
        })
}

fn normalise(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_prefix("Showing on ").unwrap_or(text);
    let text = text.replace(',', " ");
    let text = ORDINAL_RE.replace_all(&text, "$1");
    let text = MERIDIEM_RE.replace_all(&text, |caps: &regex::Captures| {
        format!("{} {}M{}", &caps[1], caps[2].to_uppercase(), &caps[3])
    });
    let text = AT_RE.replace_all(&text, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
