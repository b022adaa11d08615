use thiserror::Error;

/// Everything that can go wrong between fetching a page and producing a record.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("GET {url} returned HTTP {status}")]
    Fetch { url: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("could not extract {url}: {reason}")]
    Extraction { url: String, reason: String },

    #[error("screening URL has no txtSessionId: {url}")]
    MissingSessionId { url: String },

    #[error("unrecognised showtime: {text:?}")]
    InvalidShowtime { text: String },
}

impl ScrapeError {
    pub fn extraction(url: &str, reason: impl Into<String>) -> Self {
        ScrapeError::Extraction {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
