//! Label encoding with frozen vocabularies

use crate::error::{BurnoutError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Bidirectional mapping between category strings and dense integer codes.
///
/// Codes follow the sorted order of the vocabulary, so the same set of
/// categories always yields the same codes regardless of row order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "EncoderRepr", into = "EncoderRepr")]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

/// On-disk form: the lookup index is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct EncoderRepr {
    column: String,
    classes: Vec<String>,
}

impl From<EncoderRepr> for LabelEncoder {
    fn from(repr: EncoderRepr) -> Self {
        Self::from_classes(repr.column, repr.classes)
    }
}

impl From<LabelEncoder> for EncoderRepr {
    fn from(encoder: LabelEncoder) -> Self {
        EncoderRepr {
            column: encoder.column,
            classes: encoder.classes,
        }
    }
}

impl LabelEncoder {
    /// Fit an encoder on the observed values of `column`. Missing values are
    /// skipped; a column without any value cannot be encoded.
    pub fn fit<'a, I>(column: impl Into<String>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let column = column.into();
        let vocabulary: BTreeSet<&str> = values.into_iter().flatten().collect();
        if vocabulary.is_empty() {
            return Err(BurnoutError::PreprocessingError(format!(
                "cannot fit encoder for {}: column has no non-null values",
                column
            )));
        }
        let classes = vocabulary.into_iter().map(str::to_string).collect();
        Ok(Self::from_classes(column, classes))
    }

    fn from_classes(column: String, mut classes: Vec<String>) -> Self {
        classes.sort();
        classes.dedup();
        let index = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            column,
            classes,
            index,
        }
    }

    /// Encode a single value
    pub fn transform(&self, value: &str) -> Result<usize> {
        self.index
            .get(value)
            .copied()
            .ok_or_else(|| BurnoutError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
                valid_values: self.classes.clone(),
            })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Fitted vocabulary in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}
