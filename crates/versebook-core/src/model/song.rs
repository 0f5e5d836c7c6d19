use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ids::SongId;

/// A song as stored in the `songs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,

    /// Performing group or artist.
    pub group: String,
    pub name: String,

    /// URI pointing at the song (video, streaming page, etc.).
    pub link: String,
    pub release_date: DateTime<Utc>,

    /// Set by the store when the row is created. Never updated.
    pub inserted_at: DateTime<Utc>,
}

/// The caller-supplied part of a song, used when creating one.
///
/// The identifier and the insertion timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSong {
    pub group: String,
    pub name: String,
    pub link: String,
    pub release_date: DateTime<Utc>,
}

impl NewSong {
    #[must_use]
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        link: impl Into<String>,
        release_date: DateTime<Utc>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            link: link.into(),
            release_date,
        }
    }
}

/// Years that render as four-digit RFC 3339 text.
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Parse a user-supplied release date.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD` and `DD.MM.YYYY`. Plain dates
/// resolve to midnight UTC.
pub fn parse_release_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    let parsed = match DateTime::parse_from_rfc3339(input) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(_) => ["%Y-%m-%d", "%d.%m.%Y"]
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc()),
    };

    let ts = parsed
        .ok_or_else(|| Error::Validation(format!("unrecognised release date: {input:?}")))?;
    check_storable(&ts)?;
    Ok(ts)
}

/// Reject timestamps whose stored text would not sort chronologically.
///
/// Stored dates are compared as text, which only holds for years 0000-9999.
pub fn check_storable(ts: &DateTime<Utc>) -> Result<()> {
    if STORABLE_YEARS.contains(&ts.year()) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "release date year {} is outside 0000-9999",
            ts.year()
        )))
    }
}

/// Render a timestamp the way it is stored in the database.
///
/// Fixed-offset RFC 3339 text keeps lexical and chronological order aligned.
pub(crate) fn to_db_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}
