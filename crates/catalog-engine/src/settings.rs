use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Caps and sizes applied when building an analytics bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    pub top_countries: usize,
    pub top_genres: usize,
    pub top_directors: usize,
    pub top_cast: usize,
    pub duration_bins: usize,
    pub explorer_rows: usize,
    pub default_min_year: i32,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            top_countries: 10,
            top_genres: 15,
            top_directors: 10,
            top_cast: 10,
            duration_bins: 30,
            explorer_rows: 20,
            default_min_year: 2010,
        }
    }
}

impl AnalyticsSettings {
    /// Reads overrides from a YAML file. Keys left out keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(text)?;
        anyhow::ensure!(settings.duration_bins > 0, "duration_bins must be at least 1");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let settings = AnalyticsSettings::from_yaml_str("top_genres: 5\ndefault_min_year: 2000\n")
            .expect("parse");
        assert_eq!(settings.top_genres, 5);
        assert_eq!(settings.default_min_year, 2000);
        assert_eq!(settings.top_countries, 10);
        assert_eq!(settings.duration_bins, 30);
    }

    #[test]
    fn empty_yaml_is_the_default() {
        assert_eq!(
            AnalyticsSettings::from_yaml_str("").expect("parse"),
            AnalyticsSettings::default()
        );
    }

    #[test]
    fn zero_bins_are_refused() {
        assert!(AnalyticsSettings::from_yaml_str("duration_bins: 0").is_err());
    }
}
