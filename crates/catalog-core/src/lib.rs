//! Core domain model for the catalog analytics workspace.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CRATE_NAME: &str = "catalog-core";

/// Sentinel stored in place of a missing contributor, country, or rating value.
pub const UNKNOWN: &str = "Unknown";

/// Date layout used when a normalized record is written back as source text.
pub const RAW_DATE_FORMAT: &str = "%B %-d, %Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TitleType {
    Movie,
    #[serde(rename = "TV Show", alias = "TVShow")]
    TvShow,
}

impl TitleType {
    pub const ALL: [TitleType; 2] = [TitleType::Movie, TitleType::TvShow];

    pub fn as_str(&self) -> &'static str {
        match self {
            TitleType::Movie => "Movie",
            TitleType::TvShow => "TV Show",
        }
    }
}

impl fmt::Display for TitleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized title type `{0}`")]
pub struct UnknownTitleType(pub String);

impl FromStr for TitleType {
    type Err = UnknownTitleType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "movie" => Ok(TitleType::Movie),
            "tvshow" | "tv" => Ok(TitleType::TvShow),
            _ => Err(UnknownTitleType(s.to_string())),
        }
    }
}

/// Parses a comma-separated list such as `"Movie,TV Show"`. Blank entries are ignored.
pub fn parse_type_list(list: &str) -> Result<BTreeSet<TitleType>, UnknownTitleType> {
    list.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::parse)
        .collect()
}

/// One catalog title as ingested, before any cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub show_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub title_type: String,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub cast: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub date_added: Option<String>,
    pub release_year: i32,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub listed_in: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Canonical record held by the catalog store. Never mutated after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub show_id: Option<String>,
    pub title: String,
    pub title_type: TitleType,
    pub release_year: i32,
    pub date_added: Option<NaiveDate>,
    pub year_added: Option<i32>,
    pub month_added: Option<u32>,
    pub director: String,
    pub cast: String,
    pub country: String,
    pub rating: String,
    pub listed_in: String,
    pub duration: String,
    pub duration_minutes: Option<u32>,
    pub seasons_count: Option<u32>,
    pub description: Option<String>,
}

impl NormalizedRecord {
    /// Synthetic source text for this record. Normalizing it yields an equal record.
    pub fn to_raw(&self) -> RawRecord {
        RawRecord {
            show_id: self.show_id.clone(),
            title: self.title.clone(),
            title_type: self.title_type.as_str().to_string(),
            director: Some(self.director.clone()),
            cast: Some(self.cast.clone()),
            country: Some(self.country.clone()),
            date_added: self
                .date_added
                .map(|date| date.format(RAW_DATE_FORMAT).to_string()),
            release_year: self.release_year,
            rating: Some(self.rating.clone()),
            duration: Some(self.duration.clone()),
            listed_in: if self.listed_in.is_empty() {
                None
            } else {
                Some(self.listed_in.clone())
            },
            description: self.description.clone(),
        }
    }

    /// True when a movie carries a season-count duration. Preserved as found in the source.
    pub fn has_type_duration_mismatch(&self) -> bool {
        self.title_type == TitleType::Movie && self.seasons_count.is_some()
    }
}

/// Selection applied to a catalog store. Years are release years, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub types: BTreeSet<TitleType>,
    pub min_year: i32,
    pub max_year: i32,
}

impl FilterCriteria {
    pub fn new(types: impl IntoIterator<Item = TitleType>, min_year: i32, max_year: i32) -> Self {
        Self {
            types: types.into_iter().collect(),
            min_year,
            max_year,
        }
    }

    pub fn year_range(&self) -> (i32, i32) {
        (self.min_year, self.max_year)
    }

    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        self.types.contains(&record.title_type)
            && record.release_year >= self.min_year
            && record.release_year <= self.max_year
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRow {
    pub label: String,
    pub count: usize,
}

/// Labels ordered by count descending, ties in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedView {
    pub name: String,
    pub rows: Vec<CountRow>,
}

impl RankedView {
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub year: i32,
    pub title_type: TitleType,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendView {
    pub name: String,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCountView {
    pub name: String,
    pub rows: Vec<YearCount>,
}

impl YearCountView {
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }
}

/// Half-open `[lower, upper)` bucket; the last bucket of a histogram also includes `upper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl HistogramBin {
    /// Half-open test. Use [`HistogramView::bin_for`] to also match the closing edge.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value < self.upper
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramView {
    pub name: String,
    pub bins: Vec<HistogramBin>,
}

impl HistogramView {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Bin a value falls into, treating the last bin as closed at `upper`.
    pub fn bin_for(&self, value: f64) -> Option<&HistogramBin> {
        let last = self.bins.last()?;
        self.bins
            .iter()
            .find(|bin| bin.contains(value))
            .or_else(|| (value >= last.lower && value == last.upper).then_some(last))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub total_titles: usize,
    pub movies: usize,
    pub tv_shows: usize,
    pub countries: usize,
}

/// Row of the data explorer table shown under the charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerRow {
    pub title: String,
    pub title_type: TitleType,
    pub country: String,
    pub release_year: i32,
    pub rating: String,
    pub duration: String,
    pub listed_in: String,
}

impl From<&NormalizedRecord> for ExplorerRow {
    fn from(record: &NormalizedRecord) -> Self {
        Self {
            title: record.title.clone(),
            title_type: record.title_type,
            country: record.country.clone(),
            release_year: record.release_year,
            rating: record.rating.clone(),
            duration: record.duration.clone(),
            listed_in: record.listed_in.clone(),
        }
    }
}

/// Every view needed by the presentation layer, computed from one filtered snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsBundle {
    pub criteria: FilterCriteria,
    pub metrics: KeyMetrics,
    pub type_distribution: RankedView,
    pub top_countries: RankedView,
    pub addition_trend: TrendView,
    pub top_genres: RankedView,
    pub rating_distribution: RankedView,
    pub movie_durations: HistogramView,
    pub top_directors: RankedView,
    pub top_cast: RankedView,
    pub release_years: YearCountView,
    pub explorer: Vec<ExplorerRow>,
}
