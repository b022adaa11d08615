use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use super::first_text;
use super::showtime::{localise, parse_showtime};
use crate::error::{Result, ScrapeError};
use crate::fetcher::Fetcher;
use crate::model::Screening;

static SESSION_TIME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".session-time").unwrap());
static SCREEN_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".cinema-screen-name").unwrap());

const SESSION_PARAM: &str = "txtSessionId";

pub async fn extract_screening<F: Fetcher>(
    fetcher: &F,
    url: &str,
    default_year: i32,
) -> Result<Screening> {
    // Checked up front so a bad link costs no request.
    session_id(url)?;
    let doc = fetcher.fetch(url).await?;
    parse_screening_page(&doc, url, default_year)
}

pub fn parse_screening_page(doc: &Html, url: &str, default_year: i32) -> Result<Screening> {
    let session_id = session_id(url)?;

    let time_text = first_text(doc, &SESSION_TIME)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ScrapeError::extraction(url, "no session time"))?;
    let start = localise(parse_showtime(&time_text, default_year)?)?;

    // "Screen 3" -> "3"
    let screen = first_text(doc, &SCREEN_NAME)
        .and_then(|name| name.chars().last())
        .map(String::from)
        .ok_or_else(|| ScrapeError::extraction(url, "no screen name"))?;

    Ok(Screening {
        start,
        screen,
        url: url.to_string(),
        session_id,
    })
}

/// The `txtSessionId` query parameter of a booking URL.
pub fn session_id(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == SESSION_PARAM)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ScrapeError::MissingSessionId {
            url: url.to_string(),
        })
}
