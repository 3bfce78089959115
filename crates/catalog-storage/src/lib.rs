//! Dataset loading for the catalog engine: reads raw catalog rows from CSV or JSON files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use catalog_core::RawRecord;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, info_span, warn};

pub const CRATE_NAME: &str = "catalog-storage";

/// Columns without which a CSV file cannot produce a single usable record.
pub const REQUIRED_COLUMNS: [&str; 3] = ["type", "release_year", "duration"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Json,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => DatasetFormat::Json,
            _ => DatasetFormat::Csv,
        }
    }
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset header is missing required column `{0}`")]
    MissingColumn(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Raw rows materialized from a dataset file, plus a fingerprint of the bytes they came from.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub path: PathBuf,
    pub format: DatasetFormat,
    pub content_hash: String,
    pub byte_size: usize,
    pub records: Vec<RawRecord>,
    pub skipped_rows: usize,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn load_dataset(path: impl AsRef<Path>) -> anyhow::Result<LoadedDataset> {
    let path = path.as_ref();
    let span = info_span!("dataset_load", path = %path.display());
    let _guard = span.enter();

    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let format = DatasetFormat::from_path(path);
    let (records, skipped_rows) = match format {
        DatasetFormat::Csv => {
            parse_csv(&bytes).with_context(|| format!("parsing {}", path.display()))?
        }
        DatasetFormat::Json => (
            serde_json::from_slice::<Vec<RawRecord>>(&bytes)
                .with_context(|| format!("parsing {}", path.display()))?,
            0,
        ),
    };

    let dataset = LoadedDataset {
        path: path.to_path_buf(),
        format,
        content_hash: sha256_hex(&bytes),
        byte_size: bytes.len(),
        records,
        skipped_rows,
    };
    info!(
        rows = dataset.records.len(),
        skipped = dataset.skipped_rows,
        bytes = dataset.byte_size,
        sha256 = %dataset.content_hash,
        "dataset loaded"
    );
    Ok(dataset)
}

/// Parses CSV bytes with a header row. Rows that fail to deserialize are skipped and counted.
pub fn parse_csv(bytes: &[u8]) -> Result<(Vec<RawRecord>, usize), DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(DatasetError::MissingColumn(column.to_string()));
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (idx, row) in reader.deserialize::<RawRecord>().enumerate() {
        match row {
            Ok(record) => records.push(record),
            Err(err) => {
                // Header is line 1, so data row `idx` sits on line idx + 2.
                warn!(line = idx + 2, error = %err, "skipping malformed dataset row");
                skipped += 1;
            }
        }
    }
    Ok((records, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HEADER: &str =
        "show_id,type,title,director,cast,country,date_added,release_year,rating,duration,listed_in,description";

    fn workspace_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    #[test]
    fn content_hashing_is_stable() {
        assert_eq!(
            sha256_hex(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn csv_rows_deserialize_with_empty_fields_as_missing() {
        let csv = format!(
            "{HEADER}\n\
             s1,Movie,Dick Johnson Is Dead,Kirsten Johnson,,United States,\"September 25, 2021\",2020,PG-13,90 min,Documentaries,A tribute\n\
             s2,TV Show,Blood & Water,,\"Ama Qamata, Khosi Ngema\",South Africa,\"September 24, 2021\",2021,TV-MA,2 Seasons,\"International TV Shows, TV Dramas\",\n"
        );
        let (records, skipped) = parse_csv(csv.as_bytes()).expect("parse");
        assert_eq!(skipped, 0);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title_type, "Movie");
        assert_eq!(records[0].cast, None);
        assert_eq!(records[0].date_added.as_deref(), Some("September 25, 2021"));
        assert_eq!(records[1].director, None);
        assert_eq!(records[1].cast.as_deref(), Some("Ama Qamata, Khosi Ngema"));
        assert_eq!(records[1].release_year, 2021);
    }

    #[test]
    fn malformed_release_year_skips_only_that_row() {
        let csv = format!(
            "{HEADER}\n\
             s1,Movie,Good,,,US,,2020,PG,90 min,Dramas,\n\
             s2,Movie,Bad,,,US,,not-a-year,PG,90 min,Dramas,\n"
        );
        let (records, skipped) = parse_csv(csv.as_bytes()).expect("parse");
        assert_eq!(records.len(), 1);
        assert_eq!(skipped, 1);
        assert_eq!(records[0].title, "Good");
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let err = parse_csv(b"title,type,release_year\nA,Movie,2020\n").unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(ref c) if c == "duration"));
    }

    #[test]
    fn json_datasets_are_detected_by_extension() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("titles.json");
        fs::write(
            &path,
            r#"[{"title":"A","type":"Movie","release_year":2015,"duration":"90 min"}]"#,
        )
        .expect("write");

        let dataset = load_dataset(&path).expect("load");
        assert_eq!(dataset.format, DatasetFormat::Json);
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.records[0].duration.as_deref(), Some("90 min"));
        assert_eq!(dataset.content_hash.len(), 64);
    }

    #[test]
    fn sample_fixture_loads() {
        let dataset = load_dataset(workspace_root().join("fixtures/titles_sample.csv"))
            .expect("fixture load");
        assert_eq!(dataset.format, DatasetFormat::Csv);
        assert_eq!(dataset.skipped_rows, 0);
        assert_eq!(dataset.records.len(), 12);
    }
}
