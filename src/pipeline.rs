use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::error::{Result, ScrapeError};
use crate::fetcher::Fetcher;
use crate::model::Film;
use crate::parser::film::extract_film;

/// A film page that could not be turned into a [`Film`].
#[derive(Debug)]
pub struct FilmFailure {
    pub url: String,
    pub error: ScrapeError,
}

/// Result of a run: every film that extracted cleanly, plus the ones that didn't.
#[derive(Debug, Default)]
pub struct Harvest {
    pub films: Vec<Film>,
    pub failures: Vec<FilmFailure>,
}

impl Harvest {
    pub fn screening_count(&self) -> usize {
        self.films.iter().map(|f| f.screenings.len()).sum()
    }
}

/// Extract every film in `urls`, one after another.
///
/// A failed film is recorded and skipped, unless `strict` is set, in which
/// case the first failure ends the run.
pub async fn harvest<F: Fetcher>(
    fetcher: &F,
    urls: &[String],
    default_year: i32,
    strict: bool,
) -> Result<Harvest> {
    let pb = ProgressBar::new(urls.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut out = Harvest::default();
    for url in urls {
        pb.set_message(short_name(url).to_string());
        match extract_film(fetcher, url, default_year).await {
            Ok(film) => out.films.push(film),
            Err(error) if strict => {
                pb.abandon();
                return Err(error);
            }
            Err(error) => {
                pb.suspend(|| warn!("Skipping {}: {}", url, error));
                out.failures.push(FilmFailure {
                    url: url.clone(),
                    error,
                });
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(out)
}

fn short_name(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar;
    use crate::parser::film::tests::{festival, FALLEN_LEAVES, PAST_LIVES};
    use chrono::{TimeZone, Utc};

    const BROKEN: &str = "https://www.cambridgefilmfestival.org.uk/films/broken";

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn two_films_three_events() {
        let harvest = harvest(&festival(), &urls(&[FALLEN_LEAVES, PAST_LIVES]), 2023, false)
            .await
            .unwrap();
        assert!(harvest.failures.is_empty());
        assert_eq!(harvest.films.len(), 2);
        assert_eq!(harvest.screening_count(), 3);

        let now = Utc.with_ymd_and_hms(2023, 10, 1, 0, 0, 0).unwrap();
        let ics = calendar::render(&harvest.films, now).replace("\r\n ", "");
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 3);

        let past_lives = &harvest.films[1];
        assert_eq!(past_lives.title, "Past Lives");
        let first = calendar::describe(past_lives, 0);
        let second = calendar::describe(past_lives, 1);
        assert!(first.contains("Also playing on:\nSat 21 Oct, 1:30 PM, Screen 1"));
        assert!(!first.contains("Thu 19 Oct"));
        assert!(second.contains("Also playing on:\nThu 19 Oct, 6:00 PM, Screen 3"));
        assert!(!second.contains("Sat 21 Oct"));
        assert!(!calendar::describe(&harvest.films[0], 0).contains("Also playing on:"));
    }

    #[tokio::test]
    async fn failures_are_collected_not_fatal() {
        let harvest = harvest(&festival(), &urls(&[BROKEN, PAST_LIVES]), 2023, false)
            .await
            .unwrap();
        assert_eq!(harvest.films.len(), 1);
        assert_eq!(harvest.failures.len(), 1);
        assert_eq!(harvest.failures[0].url, BROKEN);
        assert!(matches!(harvest.failures[0].error, ScrapeError::Fetch { status: 404, .. }));
    }

    #[tokio::test]
    async fn strict_stops_at_first_failure() {
        let err = harvest(&festival(), &urls(&[BROKEN, PAST_LIVES]), 2023, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { .. }));
    }

    #[test]
    fn short_name_is_last_segment() {
        assert_eq!(short_name(PAST_LIVES), "past-lives");
        assert_eq!(short_name("https://x/films/a/"), "a");
    }
}
