//! Artifact persistence
//!
//! A trained model is stored as four JSON files in one directory:
//!
//! - `model.json` - the fitted [`RandomForest`]
//! - `label_encoders.json` - per-column vocabularies, including `Burnout_Level`
//! - `scaler.json` - mean and scale of the numeric columns
//! - `mental_imputer.json` - fill value for `Mental_Health_Status`
//!
//! The files are only meaningful together; [`ArtifactBundle::load`] checks that
//! they agree with each other before handing them out.

use crate::error::{BurnoutError, Result};
use crate::preprocessing::{
    feature_columns, FittedPreprocessor, Imputer, LabelEncoder, StandardScaler, N_FEATURES,
};
use crate::training::RandomForest;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MODEL_FILE: &str = "model.json";
pub const ENCODERS_FILE: &str = "label_encoders.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const IMPUTER_FILE: &str = "mental_imputer.json";

/// All artifact file names, in write order
pub const ARTIFACT_FILES: [&str; 4] = [MODEL_FILE, ENCODERS_FILE, SCALER_FILE, IMPUTER_FILE];

/// Preprocessing state and model produced by one training run
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub preprocessor: FittedPreprocessor,
    pub model: RandomForest,
}

impl ArtifactBundle {
    pub fn new(preprocessor: FittedPreprocessor, model: RandomForest) -> Self {
        Self { preprocessor, model }
    }

    /// Write all artifacts into `dir`, creating it if needed.
    ///
    /// The files are first written to a staging directory next to `dir` and
    /// then renamed into place, so a failed save leaves no partial set behind.
    pub fn save(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let payloads = [
            (MODEL_FILE, serde_json::to_string(&self.model)?),
            (ENCODERS_FILE, serde_json::to_string_pretty(self.preprocessor.encoders())?),
            (SCALER_FILE, serde_json::to_string_pretty(self.preprocessor.scaler())?),
            (IMPUTER_FILE, serde_json::to_string_pretty(self.preprocessor.mental_imputer())?),
        ];

        let parent = match dir.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| artifact_error(parent, e))?;
        let staging = tempfile::Builder::new()
            .prefix(".artifacts-")
            .tempdir_in(parent)
            .map_err(|e| artifact_error(parent, e))?;

        for (name, json) in &payloads {
            let path = staging.path().join(name);
            fs::write(&path, json).map_err(|e| artifact_error(&path, e))?;
        }

        fs::create_dir_all(dir).map_err(|e| artifact_error(dir, e))?;
        for name in ARTIFACT_FILES {
            let dest = dir.join(name);
            if dest.is_dir() {
                return Err(artifact_error(&dest, "destination is a directory"));
            }
        }

        let mut written = Vec::with_capacity(payloads.len());
        for name in ARTIFACT_FILES {
            let dest = dir.join(name);
            fs::rename(staging.path().join(name), &dest).map_err(|e| artifact_error(&dest, e))?;
            written.push(dest);
        }

        info!(dir = %dir.display(), files = written.len(), "Saved artifacts");
        Ok(written)
    }

    /// Read and cross-check all artifacts from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let model: RandomForest = read_json(&dir.join(MODEL_FILE))?;
        let encoders: BTreeMap<String, LabelEncoder> = read_json(&dir.join(ENCODERS_FILE))?;
        let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;
        let mental_imputer: Imputer = read_json(&dir.join(IMPUTER_FILE))?;

        let bundle = Self::new(
            FittedPreprocessor::from_parts(mental_imputer, encoders, scaler),
            model,
        );
        bundle.validate()?;

        info!(
            dir = %dir.display(),
            n_trees = bundle.model.n_trees(),
            n_classes = bundle.model.n_classes(),
            "Loaded artifacts"
        );
        Ok(bundle)
    }

    /// Check that the preprocessing state and the model describe the same
    /// feature layout and label vocabulary.
    pub fn validate(&self) -> Result<()> {
        self.preprocessor.validate()?;

        if self.model.n_trees() == 0 {
            return Err(BurnoutError::ModelNotFitted);
        }
        if self.model.n_features() != N_FEATURES {
            return Err(BurnoutError::ConfigError(format!(
                "model expects {} features, preprocessing produces {}",
                self.model.n_features(),
                N_FEATURES
            )));
        }
        if self.model.feature_names() != feature_columns().as_slice() {
            return Err(BurnoutError::ConfigError(format!(
                "model feature order {:?} does not match {:?}",
                self.model.feature_names(),
                feature_columns()
            )));
        }

        let n_labels = self
            .preprocessor
            .label_encoder()
            .map(LabelEncoder::n_classes)
            .unwrap_or(0);
        if self.model.n_classes() != n_labels {
            return Err(BurnoutError::ConfigError(format!(
                "model predicts {} classes but the label encoder knows {}",
                self.model.n_classes(),
                n_labels
            )));
        }
        self.model.check_trees()

    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path).map_err(|e| artifact_error(path, e))?;
    serde_json::from_str(&json).map_err(|e| artifact_error(path, e))
}

fn artifact_error(path: &Path, reason: impl std::fmt::Display) -> BurnoutError {
    BurnoutError::ArtifactError {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::test_support::record;
    use crate::preprocessing::SurveyRecord;

    fn trained_bundle() -> ArtifactBundle {
        let records: Vec<SurveyRecord> = (0..30)
            .map(|i| {
                let gender = if i % 2 == 0 { "Female" } else { "Male" };
                let mental = if i % 5 == 0 { None } else { Some("Anxiety") };
                record(gender, mental, 25.0 + i as f64)
            })
            .collect();
        let labels: Vec<String> = (0..30)
            .map(|i| ["High", "Low", "Medium"][i % 3].to_string())
            .collect();

        let (mut preprocessor, x) = FittedPreprocessor::fit_transform(&records).unwrap();
        let y = preprocessor.fit_label_encoder(&labels).unwrap();
        let mut model = RandomForest::new_classifier(5)
            .with_random_state(42)
            .with_feature_names(feature_columns());
        model.fit(&x, &y).unwrap();
        ArtifactBundle::new(preprocessor, model)
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = trained_bundle();

        let written = bundle.save(dir.path()).unwrap();
        assert_eq!(written.len(), 4);
        for name in ARTIFACT_FILES {
            assert!(dir.path().join(name).exists(), "missing {}", name);
        }

        let loaded = ArtifactBundle::load(dir.path()).unwrap();
        assert_eq!(loaded.model.n_trees(), 5);
        assert_eq!(
            loaded.preprocessor.label_encoder().unwrap().classes(),
            &["High", "Low", "Medium"]
        );

        let sample = record("Male", Some("Anxiety"), 41.0);
        let a = bundle.preprocessor.transform(&sample).unwrap();
        let b = loaded.preprocessor.transform(&sample).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        trained_bundle().save(dir.path()).unwrap();
        fs::remove_file(dir.path().join(SCALER_FILE)).unwrap();

        match ArtifactBundle::load(dir.path()) {
            Err(BurnoutError::ArtifactError { path, .. }) => assert!(path.ends_with(SCALER_FILE)),
            other => panic!("expected ArtifactError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        trained_bundle().save(dir.path()).unwrap();
        fs::write(dir.path().join(MODEL_FILE), "{ not json").unwrap();

        assert!(matches!(
            ArtifactBundle::load(dir.path()),
            Err(BurnoutError::ArtifactError { .. })
        ));
    }

    fn rewrite_first_root(dir: &Path, root: serde_json::Value) {
        let path = dir.join(MODEL_FILE);
        let mut model: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        model["trees"][0]["root"] = root;
        fs::write(&path, model.to_string()).unwrap();
    }

    #[test]
    fn test_leaf_class_out_of_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        trained_bundle().save(dir.path()).unwrap();
        rewrite_first_root(
            dir.path(),
            serde_json::json!({ "Leaf": { "class": 9, "n_samples": 1 } }),
        );

        assert!(matches!(
            ArtifactBundle::load(dir.path()),
            Err(BurnoutError::ConfigError(_))
        ));
    }

    #[test]
    fn test_split_feature_out_of_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        trained_bundle().save(dir.path()).unwrap();
        rewrite_first_root(
            dir.path(),
            serde_json::json!({ "Split": {
                "feature_idx": 99,
                "threshold": 0.0,
                "left": { "Leaf": { "class": 0, "n_samples": 1 } },
                "right": { "Leaf": { "class": 1, "n_samples": 1 } },
                "n_samples": 2,
                "impurity": 0.5
            }}),
        );

        assert!(matches!(
            ArtifactBundle::load(dir.path()),
            Err(BurnoutError::ConfigError(_))
        ));
    }

    #[test]
    fn test_failed_save_leaves_no_partial_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let models = dir.path().join("models");
        fs::create_dir_all(models.join(SCALER_FILE)).unwrap();

        assert!(matches!(
            trained_bundle().save(&models),
            Err(BurnoutError::ArtifactError { .. })
        ));
        assert!(!models.join(MODEL_FILE).exists());
        assert!(!models.join(ENCODERS_FILE).exists());

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".artifacts-"))
            .collect();
        assert!(leftovers.is_empty(), "staging directory left behind");
    }

    #[test]
    fn test_save_overwrites_previous_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = trained_bundle();
        bundle.save(dir.path()).unwrap();
        bundle.save(dir.path()).unwrap();
        assert!(ArtifactBundle::load(dir.path()).is_ok());
    }

    #[test]
    fn test_encoders_without_label_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        trained_bundle().save(dir.path()).unwrap();

        let path = dir.path().join(ENCODERS_FILE);
        let mut encoders: BTreeMap<String, LabelEncoder> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        encoders.remove("Burnout_Level");
        fs::write(&path, serde_json::to_string(&encoders).unwrap()).unwrap();

        assert!(matches!(
            ArtifactBundle::load(dir.path()),
            Err(BurnoutError::ConfigError(_))
        ));
    }
}
