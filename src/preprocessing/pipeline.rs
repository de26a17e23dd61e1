//! Shared feature transform
//!
//! [`FittedPreprocessor`] is the single place where a [`SurveyRecord`] becomes
//! a feature vector. Training calls [`FittedPreprocessor::fit_transform`];
//! serving calls [`FittedPreprocessor::transform`] on the loaded artifacts.
//! Both go through the same per-record code path.

use super::{
    age_group, feature_columns, Imputer, ImputeStrategy, LabelEncoder, StandardScaler,
    SurveyRecord, CATEGORICAL_COLUMNS, LABEL_COLUMN, MENTAL_HEALTH_STATUS, N_FEATURES,
    NUMERIC_COLUMNS, PHYSICAL_HEALTH_FILL, PHYSICAL_HEALTH_ISSUES,
};
use crate::error::{BurnoutError, Result};
use ndarray::Array2;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Fitted preprocessing state: imputer, per-column encoders and scaler.
#[derive(Debug, Clone)]
pub struct FittedPreprocessor {
    mental_imputer: Imputer,
    physical_fill: Imputer,
    encoders: BTreeMap<String, LabelEncoder>,
    scaler: StandardScaler,
}

impl FittedPreprocessor {
    /// Assemble a preprocessor from loaded artifacts.
    pub fn from_parts(
        mental_imputer: Imputer,
        encoders: BTreeMap<String, LabelEncoder>,
        scaler: StandardScaler,
    ) -> Self {
        Self {
            mental_imputer,
            physical_fill: Imputer::constant(PHYSICAL_HEALTH_ISSUES, PHYSICAL_HEALTH_FILL),
            encoders,
            scaler,
        }
    }

    /// Fit imputer, categorical encoders and scaler on training records.
    pub fn fit(records: &[SurveyRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(BurnoutError::PreprocessingError(
                "cannot fit preprocessing on an empty dataset".to_string(),
            ));
        }

        let mut mental_imputer = Imputer::new(MENTAL_HEALTH_STATUS, ImputeStrategy::MostFrequent);
        mental_imputer.fit(records.iter().map(|r| r.mental_health_status.as_deref()))?;

        let mut preprocessor = Self::from_parts(mental_imputer, BTreeMap::new(), StandardScaler::new());

        for column in CATEGORICAL_COLUMNS {
            let values = records
                .iter()
                .map(|r| preprocessor.impute(r, column))
                .collect::<Result<Vec<String>>>()?;
            let encoder = LabelEncoder::fit(column, values.iter().map(|v| Some(v.as_str())))?;
            debug!(column, n_classes = encoder.n_classes(), "Fitted encoder");
            preprocessor.encoders.insert(column.to_string(), encoder);
        }

        let numeric: Vec<f64> = records.iter().flat_map(|r| r.numeric_values()).collect();
        let numeric = Array2::from_shape_vec((records.len(), NUMERIC_COLUMNS.len()), numeric)
            .map_err(|e| BurnoutError::PreprocessingError(e.to_string()))?;
        preprocessor.scaler.fit(&numeric, &NUMERIC_COLUMNS)?;

        Ok(preprocessor)
    }

    /// Fit on `records` and return the transformed feature matrix.
    pub fn fit_transform(records: &[SurveyRecord]) -> Result<(Self, Array2<f64>)> {
        let preprocessor = Self::fit(records)?;
        let x = preprocessor.transform_batch(records)?;
        Ok((preprocessor, x))
    }

    /// Transform one record into a feature vector in `feature_columns()` order.
    pub fn transform(&self, record: &SurveyRecord) -> Result<Vec<f64>> {
        let mut features = Vec::with_capacity(N_FEATURES);
        let mut mental_code = 0.0;

        for column in CATEGORICAL_COLUMNS {
            let value = self.impute(record, column)?;
            let encoder = self.encoders.get(column).ok_or_else(|| {
                BurnoutError::ConfigError(format!("No label encoder for column {}", column))
            })?;
            let code = encoder.transform(&value)? as f64;
            if column == MENTAL_HEALTH_STATUS {
                mental_code = code;
            }
            features.push(code);
        }

        let raw = record.numeric_values();
        let scaled = self.scaler.transform_row(&raw)?;
        let [_, hours, balance, isolation] = match scaled.as_slice() {
            &[a, b, c, d] => [a, b, c, d],
            other => {
                return Err(BurnoutError::ConfigError(format!(
                    "expected {} scaled values, got {}",
                    NUMERIC_COLUMNS.len(),
                    other.len()
                )))
            }
        };
        features.extend_from_slice(&scaled);

        // Work_Load, Health_Stress_Index, Age_Group
        features.push(hours * isolation);
        features.push(balance * mental_code);
        features.push(age_group(record.age));

        if features.len() != N_FEATURES {
            return Err(BurnoutError::ConfigError(format!(
                "feature vector has {} values, expected {}",
                features.len(),
                N_FEATURES
            )));
        }
        Ok(features)
    }

    /// Transform many records into a `(n_records, N_FEATURES)` matrix.
    pub fn transform_batch(&self, records: &[SurveyRecord]) -> Result<Array2<f64>> {
        let rows = records
            .par_iter()
            .map(|r| self.transform(r))
            .collect::<Result<Vec<Vec<f64>>>>()?;
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec((records.len(), N_FEATURES), flat)
            .map_err(|e| BurnoutError::PreprocessingError(e.to_string()))
    }

    /// Fit the target encoder and store it beside the feature encoders.
    pub fn fit_label_encoder(&mut self, labels: &[String]) -> Result<Vec<usize>> {
        let encoder = LabelEncoder::fit(LABEL_COLUMN, labels.iter().map(|l| Some(l.as_str())))?;
        let codes = labels
            .iter()
            .map(|l| encoder.transform(l))
            .collect::<Result<Vec<usize>>>()?;
        self.encoders.insert(LABEL_COLUMN.to_string(), encoder);
        Ok(codes)
    }

    /// Check that every artifact needed by `transform` is present and shaped
    /// like the fixed feature layout.
    pub fn validate(&self) -> Result<()> {
        if !self.mental_imputer.is_fitted() {
            return Err(BurnoutError::ConfigError(format!(
                "imputer for {} is not fitted",
                MENTAL_HEALTH_STATUS
            )));
        }
        if self.mental_imputer.column() != MENTAL_HEALTH_STATUS {
            return Err(BurnoutError::ConfigError(format!(
                "imputer is for column {}, expected {}",
                self.mental_imputer.column(),
                MENTAL_HEALTH_STATUS
            )));
        }
        for column in CATEGORICAL_COLUMNS.iter().chain(std::iter::once(&LABEL_COLUMN)) {
            match self.encoders.get(*column) {
                None => {
                    return Err(BurnoutError::ConfigError(format!(
                        "No label encoder for column {}",
                        column
                    )))
                }
                Some(encoder) if encoder.n_classes() == 0 => {
                    return Err(BurnoutError::ConfigError(format!(
                        "encoder for column {} has an empty vocabulary",
                        column
                    )))
                }
                Some(_) => {}
            }
        }
        if self.scaler.columns() != NUMERIC_COLUMNS {
            return Err(BurnoutError::ConfigError(format!(
                "scaler columns {:?} do not match {:?}",
                self.scaler.columns(),
                NUMERIC_COLUMNS
            )));
        }
        Ok(())
    }

    /// Categorical value after imputation / fixed fill
    fn impute(&self, record: &SurveyRecord, column: &str) -> Result<String> {
        match column {
            MENTAL_HEALTH_STATUS => self.mental_imputer.transform(record.mental_health_status.as_deref()),
            PHYSICAL_HEALTH_ISSUES => self.physical_fill.transform(record.physical_health_issues.as_deref()),
            _ => record
                .categorical(column)
                .map(str::to_string)
                .ok_or_else(|| BurnoutError::InvalidInput(format!("missing field {}", column))),
        }
    }

    pub fn feature_names(&self) -> Vec<String> {
        feature_columns()
    }

    pub fn mental_imputer(&self) -> &Imputer {
        &self.mental_imputer
    }

    pub fn encoders(&self) -> &BTreeMap<String, LabelEncoder> {
        &self.encoders
    }

    pub fn encoder(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    pub fn label_encoder(&self) -> Option<&LabelEncoder> {
        self.encoders.get(LABEL_COLUMN)
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }
}
