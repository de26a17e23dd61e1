//! Random Forest classifier: bagged decision trees with per-class weights

use super::decision_tree::{argmax, DecisionTree};
use crate::error::{BurnoutError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Random Forest model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Random state
    pub random_state: Option<u64>,
    /// Weight per class code; unlisted classes weigh 1.0
    pub class_weight: BTreeMap<usize, f64>,
    /// Names of the input columns, in order
    feature_names: Vec<String>,
    feature_importances: Option<Array1<f64>>,
    n_features: usize,
    n_classes: usize,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new_classifier(100)
    }
}

impl RandomForest {
    /// Create a new classifier forest
    pub fn new_classifier(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            random_state: None,
            class_weight: BTreeMap::new(),
            feature_names: Vec::new(),
            feature_importances: None,
            n_features: 0,
            n_classes: 0,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Set per-class weights
    pub fn with_class_weight(mut self, class_weight: BTreeMap<usize, f64>) -> Self {
        self.class_weight = class_weight;
        self
    }

    /// Name the input columns; checked against the matrix width at fit time.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = names;
        self
    }

    /// Features drawn per split: `floor(sqrt(n_features))`, at least one
    fn compute_max_features(n_features: usize) -> usize {
        ((n_features as f64).sqrt().floor() as usize).max(1)
    }

    fn weight_of(&self, class: usize) -> f64 {
        self.class_weight.get(&class).copied().unwrap_or(1.0)
    }

    /// Fit the forest. `y` holds dense class codes.
    pub fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(BurnoutError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(BurnoutError::TrainingError("cannot fit on an empty matrix".to_string()));
        }
        if self.n_estimators == 0 {
            return Err(BurnoutError::TrainingError("n_estimators must be positive".to_string()));
        }
        if !self.feature_names.is_empty() && self.feature_names.len() != n_features {
            return Err(BurnoutError::ShapeError {
                expected: format!("{} features", self.feature_names.len()),
                actual: format!("{} features", n_features),
            });
        }
        if let Some((class, w)) = self.class_weight.iter().find(|(_, w)| !(w.is_finite() && **w > 0.0)) {
            return Err(BurnoutError::TrainingError(format!(
                "class weight for class {} must be positive, got {}",
                class, w
            )));
        }

        self.n_features = n_features;
        self.n_classes = y.iter().copied().max().map_or(0, |m| m + 1);
        let max_features = Self::compute_max_features(n_features);
        let base_seed = self.random_state.unwrap_or(42);
        let weights: Vec<f64> = y.iter().map(|&c| self.weight_of(c)).collect();

        // Build trees in parallel; each tree owns its RNG so the result does
        // not depend on scheduling.
        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| -> Result<DecisionTree> {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot: Vec<usize> = sample_indices.iter().map(|&i| y[i]).collect();
                let w_boot: Vec<f64> = sample_indices.iter().map(|&i| weights[i]).collect();

                let mut tree = DecisionTree::new(self.n_classes)
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_max_features(max_features)
                    .with_random_state(rng.next_u64());
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }

                tree.fit(&x_boot, &y_boot, &w_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        self.compute_feature_importances();
        debug!(
            n_trees = self.trees.len(),
            n_classes = self.n_classes,
            max_features,
            "Fitted random forest"
        );

        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut total_importances = vec![0.0; self.n_features];
        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (total, val) in total_importances.iter_mut().zip(imp.iter()) {
                    *total += val;
                }
            }
        }

        let total: f64 = total_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut total_importances {
                *imp /= total;
            }
        }

        self.feature_importances = Some(Array1::from_vec(total_importances));
    }

    /// Vote counts per class for one row
    pub fn votes_row(&self, row: ArrayView1<f64>) -> Result<Vec<usize>> {
        if self.trees.is_empty() {
            return Err(BurnoutError::ModelNotFitted);
        }
        if row.len() != self.n_features {
            return Err(BurnoutError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", row.len()),
            });
        }

        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            let class = tree.predict_row(row)?;
            let slot = votes.get_mut(class).ok_or_else(|| {
                BurnoutError::ConfigError(format!(
                    "tree predicted class {} but the forest has {} classes",
                    class, self.n_classes
                ))
            })?;
            *slot += 1;
        }
        Ok(votes)
    }

    /// Majority vote for one row; ties go to the lowest class code.
    pub fn predict_row(&self, row: ArrayView1<f64>) -> Result<usize> {
        let votes = self.votes_row(row)?;
        let as_f64: Vec<f64> = votes.iter().map(|&v| v as f64).collect();
        Ok(argmax(&as_f64))
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        if self.trees.is_empty() {
            return Err(BurnoutError::ModelNotFitted);
        }
        (0..x.nrows())
            .into_par_iter()
            .map(|i| self.predict_row(x.row(i)))
            .collect()
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Feature names paired with their importance, most important first
    pub fn ranked_importances(&self) -> Vec<(String, f64)> {
        let Some(importances) = &self.feature_importances else {
            return Vec::new();
        };
        let mut ranked: Vec<(String, f64)> = importances
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let name = self
                    .feature_names
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("feature_{}", i));
                (name, v)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Check every tree against the forest's feature width and class count.
    pub fn check_trees(&self) -> Result<()> {
        for (i, tree) in self.trees.iter().enumerate() {
            tree.check_bounds(self.n_features, self.n_classes)
                .map_err(|e| BurnoutError::ConfigError(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }

    /// Get number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}
