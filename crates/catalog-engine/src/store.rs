//! Write-once, read-many holder of normalized records.

use std::collections::BTreeMap;

use catalog_core::{FilterCriteria, NormalizedRecord, RawRecord, TitleType};
use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::error::{CriteriaIssue, QueryError};
use crate::normalize::try_normalize;

/// Data-quality tally produced by [`CatalogStore::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub total_raw: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub rejected_by_reason: BTreeMap<String, usize>,
    pub missing_dates: usize,
    pub type_duration_mismatches: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    records: Vec<NormalizedRecord>,
    report: LoadReport,
}

impl CatalogStore {
    /// Normalizes every raw record, keeping source order and dropping rejected rows.
    pub fn build(raws: &[RawRecord]) -> Self {
        let span = info_span!("catalog_build", rows = raws.len());
        let _guard = span.enter();

        let mut report = LoadReport {
            total_raw: raws.len(),
            ..Default::default()
        };
        let mut records = Vec::with_capacity(raws.len());

        for raw in raws {
            match try_normalize(raw) {
                Ok(record) => {
                    if record.date_added.is_none() {
                        report.missing_dates += 1;
                    }
                    if record.has_type_duration_mismatch() {
                        // Kept as found; the source may have mislabelled the title.
                        warn!(
                            title = %record.title,
                            duration = %record.duration,
                            "movie carries a season-count duration"
                        );
                        report.type_duration_mismatches += 1;
                    }
                    records.push(record);
                }
                Err(reason) => {
                    report.rejected += 1;
                    *report
                        .rejected_by_reason
                        .entry(reason.kind().to_string())
                        .or_default() += 1;
                }
            }
        }
        report.accepted = records.len();

        info!(
            accepted = report.accepted,
            rejected = report.rejected,
            missing_dates = report.missing_dates,
            mismatches = report.type_duration_mismatches,
            "catalog store built"
        );
        Self { records, report }
    }

    /// Wraps records that were normalized elsewhere.
    pub fn from_records(records: Vec<NormalizedRecord>) -> Self {
        let report = LoadReport {
            total_raw: records.len(),
            accepted: records.len(),
            missing_dates: records.iter().filter(|r| r.date_added.is_none()).count(),
            type_duration_mismatches: records
                .iter()
                .filter(|r| r.has_type_duration_mismatch())
                .count(),
            ..Default::default()
        };
        Self { records, report }
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    pub fn filter(&self, criteria: &FilterCriteria) -> Result<Vec<&NormalizedRecord>, QueryError> {
        validate_criteria(criteria)?;
        Ok(self.records.iter().filter(|r| criteria.matches(r)).collect())
    }

    pub fn release_year_bounds(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|r| r.release_year).min()?;
        let max = self.records.iter().map(|r| r.release_year).max()?;
        Some((min, max))
    }

    /// Title types present in the store, in first-seen order.
    pub fn available_types(&self) -> Vec<TitleType> {
        let mut seen = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.title_type) {
                seen.push(record.title_type);
            }
        }
        seen
    }

    /// Every type over the full release-year span.
    pub fn full_criteria(&self) -> FilterCriteria {
        let (min_year, max_year) = self.release_year_bounds().unwrap_or((0, 0));
        FilterCriteria::new(self.criteria_types(), min_year, max_year)
    }

    /// Initial dashboard selection: every type, from `default_min_year` to the newest release.
    pub fn dashboard_criteria(&self, default_min_year: i32) -> FilterCriteria {
        match self.release_year_bounds() {
            Some((lo, hi)) => FilterCriteria::new(
                self.criteria_types(),
                default_min_year.clamp(lo, hi),
                hi,
            ),
            None => FilterCriteria::new(TitleType::ALL, default_min_year, default_min_year),
        }
    }

    fn criteria_types(&self) -> Vec<TitleType> {
        let types = self.available_types();
        if types.is_empty() {
            TitleType::ALL.to_vec()
        } else {
            types
        }
    }
}

pub fn validate_criteria(criteria: &FilterCriteria) -> Result<(), QueryError> {
    if criteria.types.is_empty() {
        return Err(QueryError::InvalidCriteria(CriteriaIssue::EmptyTypeSet));
    }
    if criteria.min_year > criteria.max_year {
        return Err(QueryError::InvalidCriteria(CriteriaIssue::InvertedYearRange {
            min_year: criteria.min_year,
            max_year: criteria.max_year,
        }));
    }
    Ok(())
}
