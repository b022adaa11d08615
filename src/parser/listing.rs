use std::collections::BTreeSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::info;
use url::Url;

use crate::config::Settings;
use crate::error::Result;
use crate::fetcher::Fetcher;

static FILM_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article.film-card a.film-card__link").unwrap());

/// Fetch the "what's on" page and return every film page URL, absolute,
/// deduplicated and sorted.
pub async fn list_film_urls<F: Fetcher>(fetcher: &F, settings: &Settings) -> Result<Vec<String>> {
    info!("Fetching listing: {}", settings.listing_url);
    let doc = fetcher.fetch(&settings.listing_url).await?;
    let urls = parse_listing(&doc, &settings.base_url)?;
    info!("Found {} films", urls.len());
    Ok(urls)
}

pub fn parse_listing(doc: &Html, base_url: &str) -> Result<Vec<String>> {
    let base = Url::parse(base_url)?;
    let mut urls = BTreeSet::new();

    for link in doc.select(&FILM_LINK) {
        let href = match link.value().attr("href").map(str::trim) {
            Some(h) if !h.is_empty() => h,
            _ => continue,
        };
        urls.insert(absolutise(&base, href)?);
    }

    Ok(urls.into_iter().collect())
}

/// Leave absolute URLs alone; resolve anything else against `base`.
pub fn absolutise(base: &Url, href: &str) -> Result<String> {
    match Url::parse(href) {
        Ok(url) => Ok(url.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(base.join(href)?.to_string()),
        Err(e) => Err(e.into()),
    }
}
