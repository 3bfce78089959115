//! Aggregate views over a filtered record set.
//!
//! Ranked views order labels by count descending. Equal counts keep the order in which their
//! labels were first encountered, never alphabetical order, so results are reproducible for a
//! given input sequence.

use std::collections::BTreeMap;

use catalog_core::{
    CountRow, HistogramBin, HistogramView, NormalizedRecord, RankedView, TitleType, TrendPoint,
    TrendView, YearCount, YearCountView,
};
use indexmap::IndexMap;

use crate::expand::{expand, MultiValueField};

pub const TYPE_DISTRIBUTION: &str = "type_distribution";
pub const TOP_COUNTRIES: &str = "top_countries";
pub const ADDITION_TREND: &str = "addition_trend";
pub const TOP_GENRES: &str = "top_genres";
pub const RATING_DISTRIBUTION: &str = "rating_distribution";
pub const MOVIE_DURATIONS: &str = "movie_durations";
pub const TOP_DIRECTORS: &str = "top_directors";
pub const TOP_CAST: &str = "top_cast";
pub const RELEASE_YEARS: &str = "release_years";

/// Counts labels and ranks them. `limit` of `None` keeps every label.
pub fn rank_labels<'a, I>(labels: I, limit: Option<usize>) -> Vec<CountRow>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }

    let mut rows = counts
        .into_iter()
        .map(|(label, count)| CountRow {
            label: label.to_string(),
            count,
        })
        .collect::<Vec<_>>();
    // sort_by is stable, which preserves first-seen order among ties.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}

fn ranked(name: &str, rows: Vec<CountRow>) -> RankedView {
    RankedView {
        name: name.to_string(),
        rows,
    }
}

pub fn type_distribution(records: &[&NormalizedRecord]) -> RankedView {
    let rows = rank_labels(records.iter().map(|r| r.title_type.as_str()), None);
    ranked(TYPE_DISTRIBUTION, rows)
}

/// The whole country string is one label; co-productions are not split.
pub fn country_ranking(records: &[&NormalizedRecord], limit: Option<usize>) -> RankedView {
    let rows = rank_labels(records.iter().map(|r| r.country.as_str()), limit);
    ranked(TOP_COUNTRIES, rows)
}

pub fn rating_distribution(records: &[&NormalizedRecord]) -> RankedView {
    let rows = rank_labels(records.iter().map(|r| r.rating.as_str()), None);
    ranked(RATING_DISTRIBUTION, rows)
}

pub fn genre_ranking(records: &[&NormalizedRecord], limit: Option<usize>) -> RankedView {
    token_ranking(TOP_GENRES, records, MultiValueField::Genres, limit)
}

pub fn director_ranking(records: &[&NormalizedRecord], limit: Option<usize>) -> RankedView {
    token_ranking(TOP_DIRECTORS, records, MultiValueField::Directors, limit)
}

pub fn cast_ranking(records: &[&NormalizedRecord], limit: Option<usize>) -> RankedView {
    token_ranking(TOP_CAST, records, MultiValueField::Cast, limit)
}

fn token_ranking(
    name: &str,
    records: &[&NormalizedRecord],
    field: MultiValueField,
    limit: Option<usize>,
) -> RankedView {
    let tokens = expand(records.iter().copied(), field);
    ranked(name, rank_labels(tokens, limit))
}

/// Titles added per year and type. Records without an addition date are left out.
pub fn addition_trend(records: &[&NormalizedRecord]) -> TrendView {
    let mut groups: BTreeMap<(i32, TitleType), usize> = BTreeMap::new();
    for record in records {
        if let Some(year) = record.year_added {
            *groups.entry((year, record.title_type)).or_default() += 1;
        }
    }
    TrendView {
        name: ADDITION_TREND.to_string(),
        points: groups
            .into_iter()
            .map(|((year, title_type), count)| TrendPoint {
                year,
                title_type,
                count,
            })
            .collect(),
    }
}

pub fn release_year_trend(records: &[&NormalizedRecord]) -> YearCountView {
    let mut years: BTreeMap<i32, usize> = BTreeMap::new();
    for record in records {
        *years.entry(record.release_year).or_default() += 1;
    }
    YearCountView {
        name: RELEASE_YEARS.to_string(),
        rows: years
            .into_iter()
            .map(|(year, count)| YearCount { year, count })
            .collect(),
    }
}

/// Equal-width histogram of movie runtimes spanning the observed minimum and maximum.
///
/// Every bin is emitted, empty ones included. When all runtimes are equal a single bin holds
/// them.
pub fn movie_duration_histogram(records: &[&NormalizedRecord], bin_count: usize) -> HistogramView {
    let minutes = records
        .iter()
        .filter(|r| r.title_type == TitleType::Movie)
        .filter_map(|r| r.duration_minutes)
        .map(f64::from)
        .collect::<Vec<_>>();

    HistogramView {
        name: MOVIE_DURATIONS.to_string(),
        bins: histogram_bins(&minutes, bin_count),
    }
}

pub fn histogram_bins(values: &[f64], bin_count: usize) -> Vec<HistogramBin> {
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.iter().copied().fold(min, f64::max);

    if max <= min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let bin_count = bin_count.max(1);
    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];
    for value in values {
        let idx = (((value - min) / width).floor() as usize).min(bin_count - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            lower: min + width * idx as f64,
            upper: if idx + 1 == bin_count {
                max
            } else {
                min + width * (idx + 1) as f64
            },
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use catalog_core::RawRecord;

    struct Sample<'a> {
        title_type: &'a str,
        release_year: i32,
        duration: &'a str,
        country: Option<&'a str>,
        date_added: Option<&'a str>,
        listed_in: Option<&'a str>,
        cast: Option<&'a str>,
    }

    impl Default for Sample<'_> {
        fn default() -> Self {
            Self {
                title_type: "Movie",
                release_year: 2020,
                duration: "90 min",
                country: None,
                date_added: None,
                listed_in: None,
                cast: None,
            }
        }
    }

    fn build(sample: Sample<'_>) -> NormalizedRecord {
        normalize(&RawRecord {
            title: "t".into(),
            title_type: sample.title_type.into(),
            release_year: sample.release_year,
            duration: Some(sample.duration.into()),
            country: sample.country.map(Into::into),
            date_added: sample.date_added.map(Into::into),
            listed_in: sample.listed_in.map(Into::into),
            cast: sample.cast.map(Into::into),
            ..Default::default()
        })
        .expect("normalized")
    }

    fn labels(view: &RankedView) -> Vec<(&str, usize)> {
        view.rows.iter().map(|r| (r.label.as_str(), r.count)).collect()
    }

    #[test]
    fn ties_keep_first_encountered_order() {
        let rows = rank_labels(["b", "a", "c", "a", "c", "b"], None);
        let got: Vec<_> = rows.iter().map(|r| (r.label.as_str(), r.count)).collect();
        assert_eq!(got, [("b", 2), ("a", 2), ("c", 2)]);

        let rows = rank_labels(["z", "y", "y"], Some(1));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "y");
    }

    #[test]
    fn country_strings_are_counted_whole_and_capped() {
        let owned = [
            build(Sample {
                country: Some("US, UK"),
                ..Default::default()
            }),
            build(Sample {
                country: Some("US"),
                ..Default::default()
            }),
            build(Sample {
                country: None,
                ..Default::default()
            }),
            build(Sample {
                country: Some("US"),
                ..Default::default()
            }),
        ];
        let records: Vec<_> = owned.iter().collect();

        let all = country_ranking(&records, None);
        assert_eq!(labels(&all), [("US", 2), ("US, UK", 1), ("Unknown", 1)]);
        assert_eq!(all.total(), records.len());

        let top = country_ranking(&records, Some(2));
        assert_eq!(labels(&top), [("US", 2), ("US, UK", 1)]);
    }

    #[test]
    fn type_and_rating_distributions_keep_every_label() {
        let owned = [
            build(Sample {
                title_type: "TV Show",
                duration: "1 Season",
                ..Default::default()
            }),
            build(Sample::default()),
            build(Sample::default()),
        ];
        let records: Vec<_> = owned.iter().collect();
        assert_eq!(
            labels(&type_distribution(&records)),
            [("Movie", 2), ("TV Show", 1)]
        );
        assert_eq!(labels(&rating_distribution(&records)), [("Unknown", 3)]);
    }

    #[test]
    fn addition_trend_groups_by_year_then_type() {
        let owned = [
            build(Sample {
                title_type: "TV Show",
                duration: "2 Seasons",
                date_added: Some("May 1, 2019"),
                ..Default::default()
            }),
            build(Sample {
                date_added: Some("June 2, 2021"),
                ..Default::default()
            }),
            build(Sample {
                date_added: Some("July 3, 2019"),
                ..Default::default()
            }),
            build(Sample {
                date_added: None,
                ..Default::default()
            }),
            build(Sample {
                date_added: Some("August 4, 2019"),
                ..Default::default()
            }),
        ];
        let records: Vec<_> = owned.iter().collect();
        let trend = addition_trend(&records);
        let points: Vec<_> = trend
            .points
            .iter()
            .map(|p| (p.year, p.title_type, p.count))
            .collect();
        assert_eq!(
            points,
            [
                (2019, TitleType::Movie, 2),
                (2019, TitleType::TvShow, 1),
                (2021, TitleType::Movie, 1),
            ]
        );
    }

    #[test]
    fn release_years_are_ascending_and_sum_to_input() {
        let owned = [
            build(Sample {
                release_year: 2018,
                ..Default::default()
            }),
            build(Sample {
                release_year: 2001,
                ..Default::default()
            }),
            build(Sample {
                release_year: 2018,
                ..Default::default()
            }),
        ];
        let records: Vec<_> = owned.iter().collect();
        let view = release_year_trend(&records);
        let rows: Vec<_> = view.rows.iter().map(|r| (r.year, r.count)).collect();
        assert_eq!(rows, [(2001, 1), (2018, 2)]);
        assert_eq!(view.total(), records.len());
    }

    #[test]
    fn token_rankings_count_every_expanded_token() {
        let owned = [
            build(Sample {
                listed_in: Some("Drama, Comedy"),
                cast: Some("X, Y"),
                ..Default::default()
            }),
            build(Sample {
                listed_in: Some("Drama"),
                cast: None,
                ..Default::default()
            }),
            build(Sample {
                listed_in: Some("Horror, Comedy, Drama"),
                cast: Some("Y"),
                ..Default::default()
            }),
        ];
        let records: Vec<_> = owned.iter().collect();

        let genres = genre_ranking(&records, None);
        assert_eq!(labels(&genres), [("Drama", 3), ("Comedy", 2), ("Horror", 1)]);
        assert_eq!(
            genres.total(),
            expand(records.iter().copied(), MultiValueField::Genres).len()
        );

        let cast = cast_ranking(&records, Some(10));
        assert_eq!(labels(&cast), [("Y", 2), ("X", 1)]);
        assert!(director_ranking(&records, Some(10)).is_empty());
    }

    #[test]
    fn histogram_uses_fixed_bins_over_observed_span() {
        let owned = [
            build(Sample {
                duration: "60 min",
                ..Default::default()
            }),
            build(Sample {
                duration: "120 min",
                ..Default::default()
            }),
            build(Sample {
                duration: "90 min",
                ..Default::default()
            }),
            build(Sample {
                title_type: "TV Show",
                duration: "3 Seasons",
                ..Default::default()
            }),
            build(Sample {
                duration: "1 Season",
                ..Default::default()
            }),
        ];
        let records: Vec<_> = owned.iter().collect();
        let view = movie_duration_histogram(&records, 30);

        assert_eq!(view.bins.len(), 30);
        assert_eq!(view.total(), 3);
        assert_eq!(view.bins[0].lower, 60.0);
        assert_eq!(view.bins[29].upper, 120.0);
        assert_eq!(view.bins[0].count, 1);
        assert_eq!(view.bins[15].count, 1);
        assert_eq!(view.bins[29].count, 1);
        for minutes in [60.0, 90.0, 120.0] {
            assert!(view.bin_for(minutes).is_some_and(|bin| bin.count == 1));
        }
        assert!(!view.bins[28].contains(view.bins[28].upper));
    }

    #[test]
    fn histogram_of_one_value_is_a_single_bin() {
        let owned = [build(Sample::default())];
        let records: Vec<_> = owned.iter().collect();
        let view = movie_duration_histogram(&records, 30);
        assert_eq!(view.bins.len(), 1);
        assert_eq!(view.bins[0].count, 1);
        assert_eq!(view.bin_for(90.0), Some(&view.bins[0]));
    }

    #[test]
    fn empty_input_yields_empty_views() {
        let records: Vec<&NormalizedRecord> = Vec::new();
        assert!(type_distribution(&records).is_empty());
        assert!(country_ranking(&records, Some(10)).is_empty());
        assert!(genre_ranking(&records, Some(15)).is_empty());
        assert!(addition_trend(&records).points.is_empty());
        assert!(release_year_trend(&records).rows.is_empty());
        assert!(movie_duration_histogram(&records, 30).bins.is_empty());
    }
}
