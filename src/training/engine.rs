//! Training engine: dataset in, artifact bundle out

use super::config::TrainingConfig;
use super::random_forest::RandomForest;
use crate::error::{BurnoutError, Result};
use crate::export::ArtifactBundle;
use crate::preprocessing::{feature_columns, FittedPreprocessor};
use crate::utils::{DataLoader, SurveyDataset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Number of features listed in the training report
const TOP_FEATURES: usize = 5;

/// Summary of a completed training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub n_rows: usize,
    pub n_features: usize,
    /// Rows per Burnout_Level value
    pub class_counts: BTreeMap<String, usize>,
    /// Accuracy on the training rows themselves
    pub training_accuracy: f64,
    /// Most important features, highest first
    pub top_features: Vec<(String, f64)>,
    /// Files written, empty when artifacts were not saved
    pub artifacts: Vec<PathBuf>,
    pub training_time_secs: f64,
}

/// Fits preprocessing and the forest, then persists the artifacts
pub struct TrainEngine {
    config: TrainingConfig,
}

impl TrainEngine {
    /// Create a new training engine
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Load the configured dataset, train, and write the artifacts.
    ///
    /// Nothing is written unless loading and fitting both succeed.
    pub fn run(&self) -> Result<(ArtifactBundle, TrainingReport)> {
        self.config.validate()?;
        let dataset = DataLoader::new().load_dataset(&self.config.data_path)?;
        let (bundle, mut report) = self.fit(&dataset)?;
        report.artifacts = bundle.save(&self.config.output_dir)?;
        Ok((bundle, report))
    }

    /// Fit preprocessing and the model in memory.
    pub fn fit(&self, dataset: &SurveyDataset) -> Result<(ArtifactBundle, TrainingReport)> {
        let start = Instant::now();
        self.config.validate()?;
        if dataset.is_empty() {
            return Err(BurnoutError::TrainingError("dataset has no rows".to_string()));
        }
        if dataset.labels.len() != dataset.records.len() {
            return Err(BurnoutError::ShapeError {
                expected: format!("{} labels", dataset.records.len()),
                actual: format!("{} labels", dataset.labels.len()),
            });
        }

        let (mut preprocessor, x) = FittedPreprocessor::fit_transform(&dataset.records)?;
        let y = preprocessor.fit_label_encoder(&dataset.labels)?;

        let params = &self.config.forest;
        let mut model = RandomForest::new_classifier(params.n_estimators)
            .with_max_depth(params.max_depth)
            .with_min_samples_split(params.min_samples_split)
            .with_random_state(params.random_state)
            .with_class_weight(params.class_weight.clone())
            .with_feature_names(feature_columns());
        model.fit(&x, &y)?;

        let predictions = model.predict(&x)?;
        let correct = predictions.iter().zip(&y).filter(|(p, t)| p == t).count();
        let training_accuracy = correct as f64 / y.len() as f64;

        let report = TrainingReport {
            n_rows: dataset.len(),
            n_features: x.ncols(),
            class_counts: dataset.class_counts(),
            training_accuracy,
            top_features: model.ranked_importances().into_iter().take(TOP_FEATURES).collect(),
            artifacts: Vec::new(),
            training_time_secs: start.elapsed().as_secs_f64(),
        };

        info!(
            rows = report.n_rows,
            trees = model.n_trees(),
            classes = model.n_classes(),
            accuracy = report.training_accuracy,
            elapsed_secs = report.training_time_secs,
            "Training complete"
        );

        Ok((ArtifactBundle::new(preprocessor, model), report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::test_support::record;
    use crate::training::ForestParams;

    fn dataset() -> SurveyDataset {
        let mut dataset = SurveyDataset::default();
        for i in 0..24 {
            let (gender, label) = match i % 3 {
                0 => ("Female", "High"),
                1 => ("Male", "Low"),
                _ => ("Non-binary", "Medium"),
            };
            dataset.records.push(record(gender, Some("Stress Disorder"), 25.0 + i as f64));
            dataset.labels.push(label.to_string());
        }
        dataset
    }

    fn small_config() -> TrainingConfig {
        TrainingConfig::default().with_forest(ForestParams {
            n_estimators: 10,
            ..ForestParams::default()
        })
    }

    #[test]
    fn test_fit_produces_consistent_bundle() {
        let engine = TrainEngine::new(small_config());
        let (bundle, report) = engine.fit(&dataset()).unwrap();

        assert!(bundle.validate().is_ok());
        assert_eq!(bundle.model.n_trees(), 10);
        assert_eq!(report.n_rows, 24);
        assert_eq!(report.n_features, 15);
        assert_eq!(report.class_counts.get("Low"), Some(&8));
        assert!(report.training_accuracy > 0.9);
        assert!(report.top_features.len() <= TOP_FEATURES);
        assert!(report.artifacts.is_empty());
    }

    #[test]
    fn test_fit_rejects_empty_dataset() {
        let engine = TrainEngine::new(small_config());
        assert!(engine.fit(&SurveyDataset::default()).is_err());
    }

    #[test]
    fn test_run_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("survey.csv");
        let mut csv = String::from(
            "Survey_Date,Age,Gender,Region,Industry,Job_Role,Work_Arrangement,Hours_Per_Week,Mental_Health_Status,Burnout_Level,Work_Life_Balance_Score,Physical_Health_Issues,Social_Isolation_Score,Salary_Range\n",
        );
        for i in 0..18 {
            let (gender, label) = if i % 2 == 0 { ("Female", "High") } else { ("Male", "Low") };
            csv.push_str(&format!(
                "2024-01-01,{},{},Europe,Technology,Engineer,Remote,{},Anxiety,{},3,None,2,$60K-80K\n",
                25 + i,
                gender,
                35 + i,
                label
            ));
        }
        std::fs::write(&data_path, csv).unwrap();

        let output = dir.path().join("models");
        let mut config = small_config();
        config.data_path = data_path;
        config.output_dir = output.clone();

        let (_, report) = TrainEngine::new(config).run().unwrap();
        assert_eq!(report.artifacts.len(), 4);
        assert!(ArtifactBundle::load(&output).is_ok());
    }
}
