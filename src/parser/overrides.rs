//! Hand-maintained fixes for broken booking links on the festival site.
//!
//! Each entry swaps the booking URL of one specific showing. Remove entries
//! once the site itself is corrected.

use chrono::{NaiveDate, NaiveDateTime};

use super::showtime::parse_showtime;

pub struct LinkOverride {
    pub title: &'static str,
    /// Local (year, month, day, hour, minute) as listed on the film page
    pub showtime: (i32, u32, u32, u32, u32),
    pub url: &'static str,
}

impl LinkOverride {
    fn starts_at(&self) -> Option<NaiveDateTime> {
        let (y, mo, d, h, mi) = self.showtime;
        NaiveDate::from_ymd_opt(y, mo, d)?.and_hms_opt(h, mi, 0)
    }
}

pub const LINK_OVERRIDES: &[LinkOverride] = &[
    // Film page links Thursday's 20:20 showing to a dead session.
    LinkOverride {
        title: "Typist Artist Pirate King",
        showtime: (2023, 10, 19, 20, 20),
        url: "https://arts.picturehouses.com/Ticketing/visSelectTickets.aspx?cinemacode=0050&txtSessionId=44227",
    },
];

/// Replacement booking URL for the showing labelled `label` of `title`.
pub fn replacement_url(title: &str, label: &str, default_year: i32) -> Option<&'static str> {
    let candidates: Vec<&LinkOverride> = LINK_OVERRIDES.iter().filter(|o| o.title == title).collect();
    if candidates.is_empty() {
        return None;
    }
    let when = parse_showtime(label, default_year).ok()?;
    candidates
        .into_iter()
        .find(|o| o.starts_at() == Some(when))
        .map(|o| o.url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_title_and_showtime() {
        let url = replacement_url("Typist Artist Pirate King", "Thu 19 Oct 20:20", 2023);
        assert_eq!(url, Some(LINK_OVERRIDES[0].url));
    }

    #[test]
    fn other_showtimes_untouched() {
        assert_eq!(
            replacement_url("Typist Artist Pirate King", "Fri 20 Oct 20:20", 2023),
            None
        );
    }

    #[test]
    fn other_titles_untouched() {
        assert_eq!(replacement_url("Past Lives", "Thu 19 Oct 20:20", 2023), None);
    }

    #[test]
    fn unparseable_label_is_no_match() {
        assert_eq!(replacement_url("Typist Artist Pirate King", "", 2023), None);
    }

    #[test]
    fn every_entry_has_a_valid_time_and_session() {
        for o in LINK_OVERRIDES {
            assert!(o.starts_at().is_some(), "{}", o.title);
            assert!(o.url.contains("txtSessionId="), "{}", o.title);
        }
    }
}
