//! Single entry point for presentation code.

use std::collections::{BTreeSet, HashSet};

use catalog_core::{
    AnalyticsBundle, ExplorerRow, FilterCriteria, KeyMetrics, NormalizedRecord, TitleType,
};
use tracing::debug;

use crate::aggregate;
use crate::error::QueryError;
use crate::settings::AnalyticsSettings;
use crate::store::CatalogStore;

#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    store: CatalogStore,
    settings: AnalyticsSettings,
}

impl AnalyticsEngine {
    pub fn new(store: CatalogStore, settings: AnalyticsSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    pub fn default_criteria(&self) -> FilterCriteria {
        self.store.dashboard_criteria(self.settings.default_min_year)
    }

    /// Fills the parts of a selection the caller left out from [`Self::default_criteria`].
    pub fn resolve_criteria(
        &self,
        types: Option<BTreeSet<TitleType>>,
        min_year: Option<i32>,
        max_year: Option<i32>,
    ) -> FilterCriteria {
        let defaults = self.default_criteria();
        FilterCriteria {
            types: types.unwrap_or(defaults.types),
            min_year: min_year.unwrap_or(defaults.min_year),
            max_year: max_year.unwrap_or(defaults.max_year),
        }
    }

    /// Computes every view from a single filtered snapshot of the store.
    pub fn query(&self, criteria: &FilterCriteria) -> Result<AnalyticsBundle, QueryError> {
        let records = self.store.filter(criteria)?;
        let settings = &self.settings;
        debug!(
            matched = records.len(),
            min_year = criteria.min_year,
            max_year = criteria.max_year,
            "analytics query"
        );

        Ok(AnalyticsBundle {
            criteria: criteria.clone(),
            metrics: key_metrics(&records),
            type_distribution: aggregate::type_distribution(&records),
            top_countries: aggregate::country_ranking(&records, Some(settings.top_countries)),
            addition_trend: aggregate::addition_trend(&records),
            top_genres: aggregate::genre_ranking(&records, Some(settings.top_genres)),
            rating_distribution: aggregate::rating_distribution(&records),
            movie_durations: aggregate::movie_duration_histogram(&records, settings.duration_bins),
            top_directors: aggregate::director_ranking(&records, Some(settings.top_directors)),
            top_cast: aggregate::cast_ranking(&records, Some(settings.top_cast)),
            release_years: aggregate::release_year_trend(&records),
            explorer: records
                .iter()
                .take(settings.explorer_rows)
                .map(|r| ExplorerRow::from(*r))
                .collect(),
        })
    }
}

/// Countries are counted as distinct raw strings, matching the country ranking.
pub fn key_metrics(records: &[&NormalizedRecord]) -> KeyMetrics {
    let countries = records
        .iter()
        .map(|r| r.country.as_str())
        .collect::<HashSet<_>>();
    KeyMetrics {
        total_titles: records.len(),
        movies: records
            .iter()
            .filter(|r| r.title_type == TitleType::Movie)
            .count(),
        tv_shows: records
            .iter()
            .filter(|r| r.title_type == TitleType::TvShow)
            .count(),
        countries: countries.len(),
    }
}
