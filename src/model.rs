use chrono::DateTime;
use chrono_tz::Tz;

/// One scheduled showing of a film.
#[derive(Debug, Clone, PartialEq)]
pub struct Screening {
    /// Local start time (Europe/London)
    pub start: DateTime<Tz>,
    /// Short screen identifier, e.g. "3"
    pub screen: String,
    pub url: String,
    /// `txtSessionId` from the booking URL; doubles as the event UID
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Film {
    pub title: String,
    pub year: Option<i32>,
    pub synopsis: String,
    /// Minutes
    pub runtime: u32,
    /// Never empty once extraction succeeds.
    pub screenings: Vec<Screening>,
    pub url: String,
}
