//! Missing value imputation for categorical columns

use crate::error::{BurnoutError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy for imputing missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with the most frequent observed category
    MostFrequent,
    /// Replace with a constant string
    ConstantString(String),
}

/// Single-column imputer for categorical values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    column: String,
    strategy: ImputeStrategy,
    fill_value: Option<String>,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(column: impl Into<String>, strategy: ImputeStrategy) -> Self {
        let fill_value = match &strategy {
            ImputeStrategy::ConstantString(v) => Some(v.clone()),
            ImputeStrategy::MostFrequent => None,
        };
        Self {
            column: column.into(),
            strategy,
            fill_value,
        }
    }

    /// Fixed-fill imputer; needs no fitting.
    pub fn constant(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(column, ImputeStrategy::ConstantString(value.into()))
    }

    /// Fit the imputer on the observed values of its column
    pub fn fit<'a, I>(&mut self, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        if let ImputeStrategy::MostFrequent = self.strategy {
            let mode = Self::compute_mode(values).ok_or_else(|| {
                BurnoutError::PreprocessingError(format!(
                    "cannot fit most-frequent imputer for {}: column has no values",
                    self.column
                ))
            })?;
            self.fill_value = Some(mode);
        }
        Ok(self)
    }

    /// Fill a single value
    pub fn transform(&self, value: Option<&str>) -> Result<String> {
        match value {
            Some(v) => Ok(v.to_string()),
            None => self
                .fill_value
                .clone()
                .ok_or(BurnoutError::ModelNotFitted),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn fill_value(&self) -> Option<&str> {
        self.fill_value.as_deref()
    }

    pub fn is_fitted(&self) -> bool {
        self.fill_value.is_some()
    }

    /// Mode of the non-missing values; ties go to the smallest category.
    fn compute_mode<'a, I>(values: I) -> Option<String>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut counts: BTreeMap<&'a str, usize> = BTreeMap::new();
        for val in values.into_iter().flatten() {
            *counts.entry(val).or_insert(0) += 1;
        }

        // BTreeMap iterates in ascending key order, so keeping only strictly
        // larger counts resolves ties toward the smallest key.
        let mut best: Option<(&str, usize)> = None;
        for (key, count) in counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((key, count));
            }
        }
        best.map(|(k, _)| k.to_string())
    }
}
