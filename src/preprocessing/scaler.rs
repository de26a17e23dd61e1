//! Standard (z-score) scaling of numeric columns

use crate::error::{BurnoutError, Result};
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Fitted parameters for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation; a constant column stores 1.0
    pub scale: f64,
}

/// Feature scaler: `(x - mean) / std` per column
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit one set of parameters per column of `x`; `columns` names them.
    pub fn fit(&mut self, x: &Array2<f64>, columns: &[&str]) -> Result<&mut Self> {
        if x.ncols() != columns.len() {
            return Err(BurnoutError::ShapeError {
                expected: format!("{} columns", columns.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        if x.nrows() == 0 {
            return Err(BurnoutError::PreprocessingError(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }

        self.params = x
            .axis_iter(Axis(1))
            .zip(columns)
            .map(|(col, name)| Self::compute_params(name, col))
            .collect();
        Ok(self)
    }

    /// Scale one row of values ordered like the fitted columns
    pub fn transform_row(&self, values: &[f64]) -> Result<Vec<f64>> {
        if self.params.is_empty() {
            return Err(BurnoutError::ModelNotFitted);
        }
        if values.len() != self.params.len() {
            return Err(BurnoutError::ConfigError(format!(
                "scaler fitted on {} columns, got {} values",
                self.params.len(),
                values.len()
            )));
        }
        Ok(values
            .iter()
            .zip(&self.params)
            .map(|(v, p)| (v - p.mean) / p.scale)
            .collect())
    }

    pub fn params(&self) -> &[ScalerParams] {
        &self.params
    }

    pub fn columns(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.column.as_str()).collect()
    }

    fn compute_params(name: &str, col: ArrayView1<f64>) -> ScalerParams {
        let n = col.len() as f64;
        let mean = col.sum() / n;
        let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        ScalerParams {
            column: name.to_string(),
            mean,
            scale: if std == 0.0 { 1.0 } else { std },
        }
    }
}
