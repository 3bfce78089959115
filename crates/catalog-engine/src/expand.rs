//! Splits comma-delimited list fields into individual tokens.

use catalog_core::{NormalizedRecord, UNKNOWN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiValueField {
    Genres,
    Directors,
    Cast,
}

impl MultiValueField {
    pub fn value<'a>(&self, record: &'a NormalizedRecord) -> &'a str {
        match self {
            MultiValueField::Genres => &record.listed_in,
            MultiValueField::Directors => &record.director,
            MultiValueField::Cast => &record.cast,
        }
    }

    /// Genres never carry the `"Unknown"` sentinel; contributor fields do.
    fn skips_unknown(&self) -> bool {
        !matches!(self, MultiValueField::Genres)
    }
}

/// Tokens in record order, then position within the record. Duplicates are kept.
pub fn expand<'a, I>(records: I, field: MultiValueField) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut tokens = Vec::new();
    for record in records {
        let value = field.value(record);
        if field.skips_unknown() && value == UNKNOWN {
            continue;
        }
        tokens.extend(split_tokens(value));
    }
    tokens
}

pub fn split_tokens(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|t| !t.is_empty())
}
