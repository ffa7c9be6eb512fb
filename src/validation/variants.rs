use std::collections::HashSet;

use crate::core::{
    AnswerField,
    KanjiRecord,
};

/// Okurigana delimiter used by the API in kun readings, e.g. `おこな.う`.
pub const OKURIGANA_DELIMITER: char = '.';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAnswerSet {
    field: AnswerField,
    variants: Vec<String>,
}

impl ValidAnswerSet {
    /// Builds the accepted answers for one field of a record. Returns `None`
    /// when the field has no usable data, which marks it unavailable.
    pub fn from_record(record: &KanjiRecord, field: AnswerField) -> Option<Self> {
        let source = record.field(field);
        let variants = match field {
            AnswerField::KunReading => expand_kun_readings(source),
            AnswerField::Meaning | AnswerField::OnReading => dedup_variants(source.iter().cloned()),
        };

        if variants.is_empty() {
            return None;
        }
        Some(Self { field, variants })
    }

    pub fn field(&self) -> AnswerField {
        self.field
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn primary(&self) -> &str {
        &self.variants[0]
    }

    pub fn accepts(&self, input: &str) -> bool {
        super::validate(input, &self.variants)
    }
}

/// Every kun reading is accepted as written. Readings with okurigana also
/// accept the stem alone and the reading with the delimiter removed:
/// `おこな.う` -> `おこな.う`, `おこな`, `おこなう`.
pub fn expand_kun_readings(readings: &[String]) -> Vec<String> {
    let mut expanded = Vec::with_capacity(readings.len() * 3);

    for reading in readings {
        expanded.push(reading.clone());

        if let Some((stem, _)) = reading.split_once(OKURIGANA_DELIMITER) {
            if !stem.trim().is_empty() {
                expanded.push(stem.to_string());
            }
            expanded.push(reading.replace(OKURIGANA_DELIMITER, ""));
        }
    }

    dedup_variants(expanded)
}

fn dedup_variants(variants: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    variants
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}
