//! Raw row cleaning: sentinel defaults, tolerant dates, typed durations.

use catalog_core::{NormalizedRecord, RawRecord, TitleType, UNKNOWN};
use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::error::RecordRejected;

/// Layouts tried in order when reading `date_added`.
const DATE_FORMATS: [&str; 5] = ["%B %d, %Y", "%b %d, %Y", "%Y-%m-%d", "%m/%d/%Y", "%d-%b-%y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDuration {
    Minutes(u32),
    Seasons(u32),
}

/// Returns `None` when the record must be excluded from the catalog.
pub fn normalize(raw: &RawRecord) -> Option<NormalizedRecord> {
    match try_normalize(raw) {
        Ok(record) => Some(record),
        Err(reason) => {
            debug!(title = %raw.title, %reason, "record rejected");
            None
        }
    }
}

pub fn try_normalize(raw: &RawRecord) -> Result<NormalizedRecord, RecordRejected> {
    let duration_text = present(raw.duration.as_deref()).ok_or(RecordRejected::MissingDuration)?;
    let parsed = parse_duration(duration_text)?;
    let title_type: TitleType = raw.title_type.parse()?;

    let date_added = present(raw.date_added.as_deref()).and_then(parse_date_added);
    if date_added.is_none() {
        debug!(
            title = %raw.title,
            date_added = ?raw.date_added,
            "date_added missing or unparseable"
        );
    }

    let (duration_minutes, seasons_count) = match parsed {
        ParsedDuration::Minutes(minutes) => (Some(minutes), None),
        ParsedDuration::Seasons(seasons) => (None, Some(seasons)),
    };

    Ok(NormalizedRecord {
        show_id: raw.show_id.clone(),
        title: raw.title.clone(),
        title_type,
        release_year: raw.release_year,
        date_added,
        year_added: date_added.map(|d| d.year()),
        month_added: date_added.map(|d| d.month()),
        director: or_unknown(raw.director.as_deref()),
        cast: or_unknown(raw.cast.as_deref()),
        country: or_unknown(raw.country.as_deref()),
        rating: or_unknown(raw.rating.as_deref()),
        listed_in: present(raw.listed_in.as_deref())
            .unwrap_or_default()
            .to_string(),
        duration: duration_text.to_string(),
        duration_minutes,
        seasons_count,
        description: raw.description.clone(),
    })
}

/// Reads the unit and leading magnitude of strings such as `"90 min"` or `"3 Seasons"`.
///
/// A minute unit wins over a season unit when both appear.
pub fn parse_duration(text: &str) -> Result<ParsedDuration, RecordRejected> {
    let text = text.trim();
    let is_minutes = text.contains("min");
    if !is_minutes && !text.contains("Season") {
        return Err(RecordRejected::UnrecognizedDuration(text.to_string()));
    }

    let magnitude = text
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<u32>().ok())
        .ok_or_else(|| RecordRejected::InvalidDurationMagnitude(text.to_string()))?;

    Ok(if is_minutes {
        ParsedDuration::Minutes(magnitude)
    } else {
        ParsedDuration::Seasons(magnitude)
    })
}

pub fn parse_date_added(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn or_unknown(value: Option<&str>) -> String {
    present(value).unwrap_or(UNKNOWN).to_string()
}
