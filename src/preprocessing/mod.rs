//! Data preprocessing module
//!
//! Everything needed to turn a raw survey response into the classifier's
//! feature vector:
//! - Missing value imputation (mode for Mental_Health_Status, fixed fill for
//!   Physical_Health_Issues)
//! - Label encoding with frozen vocabularies
//! - Standard scaling of the numeric columns
//! - Fixed-edge age binning
//! - The shared feature transform used by both training and serving

mod encoder;
mod imputer;
mod pipeline;
mod scaler;
pub mod transforms;

pub use encoder::LabelEncoder;
pub use imputer::{ImputeStrategy, Imputer};
pub use pipeline::FittedPreprocessor;
pub use scaler::{ScalerParams, StandardScaler};
pub use transforms::{age_group, AGE_BIN_EDGES, UNBINNED};

use crate::error::{BurnoutError, Result};
use serde::{Deserialize, Serialize};

pub const GENDER: &str = "Gender";
pub const REGION: &str = "Region";
pub const INDUSTRY: &str = "Industry";
pub const JOB_ROLE: &str = "Job_Role";
pub const WORK_ARRANGEMENT: &str = "Work_Arrangement";
pub const MENTAL_HEALTH_STATUS: &str = "Mental_Health_Status";
pub const PHYSICAL_HEALTH_ISSUES: &str = "Physical_Health_Issues";
pub const SALARY_RANGE: &str = "Salary_Range";
pub const AGE: &str = "Age";
pub const HOURS_PER_WEEK: &str = "Hours_Per_Week";
pub const WORK_LIFE_BALANCE_SCORE: &str = "Work_Life_Balance_Score";
pub const SOCIAL_ISOLATION_SCORE: &str = "Social_Isolation_Score";
pub const WORK_LOAD: &str = "Work_Load";
pub const HEALTH_STRESS_INDEX: &str = "Health_Stress_Index";
pub const AGE_GROUP: &str = "Age_Group";

/// Target column
pub const LABEL_COLUMN: &str = "Burnout_Level";

/// Fill value for a missing Physical_Health_Issues entry
pub const PHYSICAL_HEALTH_FILL: &str = "None";

/// Categorical feature columns, in feature order
pub const CATEGORICAL_COLUMNS: [&str; 8] = [
    GENDER,
    REGION,
    INDUSTRY,
    JOB_ROLE,
    WORK_ARRANGEMENT,
    MENTAL_HEALTH_STATUS,
    PHYSICAL_HEALTH_ISSUES,
    SALARY_RANGE,
];

/// Numeric feature columns, in feature order
pub const NUMERIC_COLUMNS: [&str; 4] = [
    AGE,
    HOURS_PER_WEEK,
    WORK_LIFE_BALANCE_SCORE,
    SOCIAL_ISOLATION_SCORE,
];

/// Engineered feature columns, in feature order
pub const DERIVED_COLUMNS: [&str; 3] = [WORK_LOAD, HEALTH_STRESS_INDEX, AGE_GROUP];

pub const N_FEATURES: usize =
    CATEGORICAL_COLUMNS.len() + NUMERIC_COLUMNS.len() + DERIVED_COLUMNS.len();

/// The exact column order of the classifier's input
pub fn feature_columns() -> Vec<String> {
    CATEGORICAL_COLUMNS
        .iter()
        .chain(NUMERIC_COLUMNS.iter())
        .chain(DERIVED_COLUMNS.iter())
        .map(|c| c.to_string())
        .collect()
}

/// One worker's survey response, without the label.
///
/// Field names on the wire match the dataset header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Industry")]
    pub industry: String,
    #[serde(rename = "Job_Role")]
    pub job_role: String,
    #[serde(rename = "Work_Arrangement")]
    pub work_arrangement: String,
    #[serde(rename = "Mental_Health_Status", default)]
    pub mental_health_status: Option<String>,
    #[serde(rename = "Physical_Health_Issues", default)]
    pub physical_health_issues: Option<String>,
    #[serde(rename = "Salary_Range")]
    pub salary_range: String,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Hours_Per_Week")]
    pub hours_per_week: f64,
    #[serde(rename = "Work_Life_Balance_Score")]
    pub work_life_balance_score: f64,
    #[serde(rename = "Social_Isolation_Score")]
    pub social_isolation_score: f64,
}

impl SurveyRecord {
    /// Reject values serde accepts but the pipeline cannot use.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in NUMERIC_COLUMNS.iter().zip(self.numeric_values()) {
            if !value.is_finite() {
                return Err(BurnoutError::InvalidInput(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Numeric values in `NUMERIC_COLUMNS` order
    pub fn numeric_values(&self) -> [f64; 4] {
        [
            self.age,
            self.hours_per_week,
            self.work_life_balance_score,
            self.social_isolation_score,
        ]
    }

    /// Raw value of a categorical column; `None` when the field is absent.
    pub fn categorical(&self, column: &str) -> Option<&str> {
        match column {
            GENDER => Some(&self.gender),
            REGION => Some(&self.region),
            INDUSTRY => Some(&self.industry),
            JOB_ROLE => Some(&self.job_role),
            WORK_ARRANGEMENT => Some(&self.work_arrangement),
            MENTAL_HEALTH_STATUS => self.mental_health_status.as_deref(),
            PHYSICAL_HEALTH_ISSUES => self.physical_health_issues.as_deref(),
            SALARY_RANGE => Some(&self.salary_range),
            _ => None,
        }
    }
}
