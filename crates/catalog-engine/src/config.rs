use std::path::PathBuf;

use anyhow::Result;
use catalog_storage::load_dataset;
use tracing::info;

use crate::query::AnalyticsEngine;
use crate::settings::AnalyticsSettings;
use crate::store::CatalogStore;

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub dataset_path: PathBuf,
    pub settings_path: Option<PathBuf>,
    pub web_port: u16,
    pub default_min_year: Option<i32>,
}

impl CatalogConfig {
    pub fn from_env() -> Self {
        Self {
            dataset_path: std::env::var("CATALOG_DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./netflix_titles.csv")),
            settings_path: std::env::var("CATALOG_SETTINGS_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            web_port: std::env::var("CATALOG_WEB_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            default_min_year: std::env::var("CATALOG_DEFAULT_MIN_YEAR")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }

    pub fn settings(&self) -> Result<AnalyticsSettings> {
        let mut settings = match &self.settings_path {
            Some(path) => AnalyticsSettings::from_yaml_file(path)?,
            None => AnalyticsSettings::default(),
        };
        if let Some(year) = self.default_min_year {
            settings.default_min_year = year;
        }
        Ok(settings)
    }
}

/// Loads the dataset once and builds the engine every query is served from.
pub fn load_engine(config: &CatalogConfig) -> Result<AnalyticsEngine> {
    let settings = config.settings()?;
    let dataset = load_dataset(&config.dataset_path)?;
    let store = CatalogStore::build(&dataset.records);
    info!(
        dataset = %dataset.path.display(),
        sha256 = %dataset.content_hash,
        skipped_rows = dataset.skipped_rows,
        titles = store.len(),
        "analytics engine ready"
    );
    Ok(AnalyticsEngine::new(store, settings))
}
