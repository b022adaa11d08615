use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::listing::absolutise;
use super::overrides::replacement_url;
use super::screening::extract_screening;
use super::text::{clean_synopsis, value_after};
use super::{element_text, first_text};
use crate::error::{Result, ScrapeError};
use crate::fetcher::Fetcher;
use crate::model::Film;

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1.film-title").unwrap());
static DETAIL_ITEMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.screening-details li").unwrap());
static SYNOPSIS: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".film-details").unwrap());
static SCREENING_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.screening-list a").unwrap());

/// Used when a film page has no parseable run time.
pub const DEFAULT_RUNTIME: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningLink {
    /// Showtime as printed on the film page
    pub label: String,
    /// Booking URL; empty when the site lists a showing with no link
    pub href: String,
}

/// Everything read off a film page before any screening page is fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmPage {
    pub title: String,
    pub year: Option<i32>,
    pub synopsis: String,
    pub runtime: Option<u32>,
    pub links: Vec<ScreeningLink>,
}

pub fn parse_film_page(doc: &Html, url: &str) -> Result<FilmPage> {
    let mut runtime = None;
    let mut year = None;

    for item in doc.select(&DETAIL_ITEMS).map(element_text) {
        if let Some(value) = value_after(&item, "Run time: ") {
            runtime = value.parse::<u32>().ok().filter(|&m| m > 0);
        } else if let Some(value) = value_after(&item, "Release year: ") {
            match value.parse::<i32>() {
                Ok(y) => year = Some(y),
                Err(_) => warn!("{}: ignoring release year {:?}", url, value),
            }
        }
    }

    let title = first_text(doc, &TITLE)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ScrapeError::extraction(url, "no title"))?;

    let synopsis = doc
        .select(&SYNOPSIS)
        .next()
        .map(|el| clean_synopsis(&element_text(el)))
        .ok_or_else(|| ScrapeError::extraction(url, "no synopsis"))?;

    let links = doc
        .select(&SCREENING_LINKS)
        .map(|a| ScreeningLink {
            label: element_text(a).split_whitespace().collect::<Vec<_>>().join(" "),
            href: a.value().attr("href").unwrap_or_default().trim().to_string(),
        })
        .collect();

    Ok(FilmPage {
        title,
        year,
        synopsis,
        runtime,
        links,
    })
}

/// Fetch a film page and each of its screenings.
///
/// Fails if the page lacks a title or synopsis, if any screening cannot be
/// extracted, or if no bookable screening is left.
pub async fn extract_film<F: Fetcher>(fetcher: &F, url: &str, default_year: i32) -> Result<Film> {
    let page = {
        let doc = fetcher.fetch(url).await?;
        parse_film_page(&doc, url)?
    };

    let runtime = page.runtime.unwrap_or_else(|| {
        warn!("{}: no run time, assuming {} mins", page.title, DEFAULT_RUNTIME);
        DEFAULT_RUNTIME
    });

    let base = Url::parse(url)?;
    let mut screenings = Vec::with_capacity(page.links.len());
    for link in &page.links {
        let href = match replacement_url(&page.title, &link.label, default_year) {
            Some(fixed) => {
                info!("{}: using patched booking link for {}", page.title, link.label);
                fixed.to_string()
            }
            None => link.href.clone(),
        };
        if href.is_empty() {
            warn!("{}: no booking link for {:?}, skipping", page.title, link.label);
            continue;
        }
        let href = absolutise(&base, &href)?;
        screenings.push(extract_screening(fetcher, &href, default_year).await?);
    }

    if screenings.is_empty() {
        return Err(ScrapeError::extraction(url, "no screenings"));
    }

    let film = Film {
        title: page.title,
        year: page.year,
        synopsis: page.synopsis,
        runtime,
        screenings,
        url: url.to_string(),
    };
    debug!(
        "{} ({}): {} mins, {} screenings",
        film.title,
        film.year.map_or_else(|| "year unknown".to_string(), |y| y.to_string()),
        film.runtime,
        film.screenings.len()
    );
    Ok(film)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fetcher::StaticPages;

    pub const PAST_LIVES: &str = "https://www.cambridgefilmfestival.org.uk/films/past-lives";
    pub const FALLEN_LEAVES: &str = "https://www.cambridgefilmfestival.org.uk/films/fallen-leaves";
    pub const TYPIST: &str =
        "https://www.cambridgefilmfestival.org.uk/films/typist-artist-pirate-king";

    pub fn booking(session: u32) -> String {
        format!(
            "https://arts.picturehouses.com/Ticketing/visSelectTickets.aspx?cinemacode=0050&txtSessionId={}",
            session
        )
    }

    pub fn screening_page(time: &str, screen: &str) -> String {
        format!(
            r#"<html><body><p class="session-time">Showing on {}</p><p class="cinema-screen-name">{}</p></body></html>"#,
            time, screen
        )
    }

    /// Two films: Past Lives (two screenings) and Fallen Leaves (one, plus a
    /// listed showing with no booking link).
    pub fn festival() -> StaticPages {
        StaticPages::new()
            .fixture(PAST_LIVES, "film_past_lives")
            .fixture(FALLEN_LEAVES, "film_fallen_leaves")
            .with(&booking(40101), screening_page("Thursday 19 October 2023 18:00", "Screen 3"))
            .with(&booking(40102), screening_page("Saturday 21 October 2023 13:30", "Screen 1"))
            .with(&booking(40201), screening_page("Friday 20 October 2023 20:45", "Screen 2"))
    }

    fn doc(name: &str) -> Html {
        Html::parse_document(&std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap())
    }

    #[test]
    fn film_page_fields() {
        let page = parse_film_page(&doc("film_past_lives"), PAST_LIVES).unwrap();
        assert_eq!(page.title, "Past Lives");
        assert_eq!(page.year, Some(2023));
        assert_eq!(page.runtime, Some(106));
        assert_eq!(
            page.synopsis,
            "Nora and Hae Sung, two deeply connected childhood friends, are wrested apart after Nora's family emigrates from South Korea."
        );
        assert_eq!(page.links.len(), 2);
        assert_eq!(page.links[0].label, "Thu 19 Oct 18:00");
        assert_eq!(page.links[0].href, booking(40101));
    }

    #[test]
    fn bad_year_and_missing_runtime_are_tolerated() {
        let page = parse_film_page(&doc("film_fallen_leaves"), FALLEN_LEAVES).unwrap();
        assert_eq!(page.year, None);
        assert_eq!(page.runtime, None);
        assert_eq!(page.links.len(), 2);
        assert_eq!(page.links[1].href, "");
    }

    #[test]
    fn missing_title_is_extraction_failure() {
        let html = Html::parse_document(r#"<div class="film-details">Synopsis
Text</div>"#);
        let err = parse_film_page(&html, PAST_LIVES).unwrap_err();
        assert!(matches!(err, ScrapeError::Extraction { ref reason, .. } if reason == "no title"));
    }

    #[test]
    fn missing_synopsis_is_extraction_failure() {
        let html = Html::parse_document(r#"<h1 class="film-title">Nameless</h1>"#);
        let err = parse_film_page(&html, PAST_LIVES).unwrap_err();
        assert!(matches!(err, ScrapeError::Extraction { ref reason, .. } if reason == "no synopsis"));
    }

    #[tokio::test]
    async fn extracts_all_screenings_in_order() {
        let film = extract_film(&festival(), PAST_LIVES, 2023).await.unwrap();
        assert_eq!(film.runtime, 106);
        assert_eq!(film.url, PAST_LIVES);
        let ids: Vec<&str> = film.screenings.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["40101", "40102"]);
        assert_eq!(film.screenings[1].screen, "1");
    }

    #[tokio::test]
    async fn defaults_runtime_and_skips_empty_links() {
        let film = extract_film(&festival(), FALLEN_LEAVES, 2023).await.unwrap();
        assert_eq!(film.runtime, DEFAULT_RUNTIME);
        assert_eq!(film.year, None);
        assert_eq!(film.screenings.len(), 1);
        assert_eq!(film.screenings[0].session_id, "40201");
    }

    #[tokio::test]
    async fn no_screenings_is_extraction_failure() {
        let fetcher = StaticPages::new().with(
            PAST_LIVES,
            r#"<h1 class="film-title">Past Lives</h1>
               <div class="film-details">Synopsis
A film.</div>
               <ul class="screening-list"><li><a href="">Thu 19 Oct 18:00</a></li></ul>"#,
        );
        let err = extract_film(&fetcher, PAST_LIVES, 2023).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Extraction { ref reason, .. } if reason == "no screenings"));
    }

    #[tokio::test]
    async fn broken_screening_link_fails_the_film() {
        let fetcher = StaticPages::new().with(
            PAST_LIVES,
            r#"<h1 class="film-title">Past Lives</h1>
               <div class="film-details">A film.</div>
               <ul class="screening-list"><li><a href="/book?id=1">Thu 19 Oct 18:00</a></li></ul>"#,
        );
        let err = extract_film(&fetcher, PAST_LIVES, 2023).await.unwrap_err();
        assert!(matches!(err, ScrapeError::MissingSessionId { .. }));
    }

    #[tokio::test]
    async fn patched_link_replaces_broken_one() {
        let fetcher = StaticPages::new()
            .fixture(TYPIST, "film_typist")
            .with(&booking(44227), screening_page("Thursday 19 October 2023 20:20", "Screen 5"))
            .with(&booking(44301), screening_page("Sunday 22 October 2023 15:10", "Screen 4"));
        let film = extract_film(&fetcher, TYPIST, 2023).await.unwrap();
        let ids: Vec<&str> = film.screenings.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["44227", "44301"]);
    }
}
