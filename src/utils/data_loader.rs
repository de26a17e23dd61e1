//! Data loading utilities

use crate::error::{BurnoutError, Result};
use crate::preprocessing::{
    SurveyRecord, AGE, CATEGORICAL_COLUMNS, GENDER, HOURS_PER_WEEK, INDUSTRY, JOB_ROLE,
    LABEL_COLUMN, MENTAL_HEALTH_STATUS, NUMERIC_COLUMNS, PHYSICAL_HEALTH_ISSUES, REGION,
    SALARY_RANGE, SOCIAL_ISOLATION_SCORE, WORK_ARRANGEMENT, WORK_LIFE_BALANCE_SCORE,
};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Cell contents treated as missing in categorical columns. This is the
/// usual CSV null vocabulary, so a literal `None` is missing too.
const MISSING_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Rows used to infer column types
const INFER_SCHEMA_ROWS: usize = 1000;

/// Columns allowed to be missing; they are filled by the preprocessing step
const NULLABLE_COLUMNS: [&str; 2] = [MENTAL_HEALTH_STATUS, PHYSICAL_HEALTH_ISSUES];

/// Labeled training data
#[derive(Debug, Clone, Default)]
pub struct SurveyDataset {
    pub records: Vec<SurveyRecord>,
    pub labels: Vec<String>,
}

impl SurveyDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows per label
    pub fn class_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// CSV loader for survey datasets
#[derive(Debug, Default)]
pub struct DataLoader;

impl DataLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a CSV file into a DataFrame
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)
            .map_err(|e| BurnoutError::DataError(format!("{}: {}", path.display(), e)))?;

        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .into_reader_with_file_handle(file);

        reader
            .finish()
            .map_err(|e| BurnoutError::DataError(format!("{}: {}", path.display(), e)))
    }

    /// Load and validate a labeled survey dataset
    pub fn load_dataset(&self, path: &Path) -> Result<SurveyDataset> {
        let start = Instant::now();
        let df = self.load_csv(path)?;
        let dataset = Self::dataset_from_frame(&df)?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            columns = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded dataset"
        );
        Ok(dataset)
    }

    /// Extract records and labels. Columns outside the feature set and the
    /// label (e.g. a survey date) are ignored.
    pub fn dataset_from_frame(df: &DataFrame) -> Result<SurveyDataset> {
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        let required: Vec<&str> = CATEGORICAL_COLUMNS
            .iter()
            .chain(NUMERIC_COLUMNS.iter())
            .chain(std::iter::once(&LABEL_COLUMN))
            .copied()
            .collect();
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|c| !names.iter().any(|n| n == c))
            .collect();
        if !missing.is_empty() {
            return Err(BurnoutError::SchemaError(format!(
                "dataset is missing required columns: {}",
                missing.join(", ")
            )));
        }
        let ignored: Vec<&String> = names
            .iter()
            .filter(|n| !required.contains(&n.as_str()))
            .collect();
        if !ignored.is_empty() {
            debug!(?ignored, "Dropping non-feature columns");
        }

        let mut text: BTreeMap<&str, Vec<Option<String>>> = BTreeMap::new();
        for column in CATEGORICAL_COLUMNS.iter().chain(std::iter::once(&LABEL_COLUMN)) {
            let values = string_column(df, column)?;
            if !NULLABLE_COLUMNS.contains(column) {
                ensure_complete(column, &values)?;
            }
            text.insert(*column, values);
        }

        let mut numbers: BTreeMap<&str, Vec<Option<f64>>> = BTreeMap::new();
        for column in NUMERIC_COLUMNS {
            let values = numeric_column(df, column)?;
            ensure_complete(column, &values)?;
            numbers.insert(column, values);
        }

        let n = df.height();
        let cat = |column: &str, i: usize| -> Option<String> {
            text.get(column).and_then(|v| v[i].clone())
        };
        let num = |column: &str, i: usize| -> f64 {
            numbers.get(column).and_then(|v| v[i]).unwrap_or(f64::NAN)
        };

        let mut dataset = SurveyDataset {
            records: Vec::with_capacity(n),
            labels: Vec::with_capacity(n),
        };
        for i in 0..n {
            dataset.records.push(SurveyRecord {
                gender: cat(GENDER, i).unwrap_or_default(),
                region: cat(REGION, i).unwrap_or_default(),
                industry: cat(INDUSTRY, i).unwrap_or_default(),
                job_role: cat(JOB_ROLE, i).unwrap_or_default(),
                work_arrangement: cat(WORK_ARRANGEMENT, i).unwrap_or_default(),
                mental_health_status: cat(MENTAL_HEALTH_STATUS, i),
                physical_health_issues: cat(PHYSICAL_HEALTH_ISSUES, i),
                salary_range: cat(SALARY_RANGE, i).unwrap_or_default(),
                age: num(AGE, i),
                hours_per_week: num(HOURS_PER_WEEK, i),
                work_life_balance_score: num(WORK_LIFE_BALANCE_SCORE, i),
                social_isolation_score: num(SOCIAL_ISOLATION_SCORE, i),
            });
            dataset.labels.push(cat(LABEL_COLUMN, i).unwrap_or_default());
        }

        if dataset.is_empty() {
            return Err(BurnoutError::SchemaError("dataset has no rows".to_string()));
        }
        Ok(dataset)
    }
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| BurnoutError::SchemaError(format!("column not found: {}", name)))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    let ca = series.str()?;
    Ok(ca
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !MISSING_TOKENS.contains(s))
                .map(str::to_string)
        })
        .collect())
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| BurnoutError::SchemaError(format!("column not found: {}", name)))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    let ca = series.f64()?;
    Ok(ca.into_iter().map(|v| v.filter(|x| x.is_finite())).collect())
}

/// Fail on the first missing cell; row numbers count the header as line 1.
fn ensure_complete<T>(column: &str, values: &[Option<T>]) -> Result<()> {
    match values.iter().position(Option::is_none) {
        Some(i) => Err(BurnoutError::SchemaError(format!(
            "column {} has a missing or invalid value at line {}",
            column,
            i + 2
        ))),
        None => Ok(()),
    }
}
