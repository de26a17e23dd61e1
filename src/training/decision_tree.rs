//! Decision tree classifier with weighted Gini impurity

use crate::error::{BurnoutError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with the predicted class
    Leaf { class: usize, n_samples: usize },
    /// Internal node: rows with `x[feature_idx] <= threshold` go left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Decision tree classifier over dense class codes `0..n_classes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features drawn at random for every split; `None` uses all of them
    pub max_features: Option<usize>,
    /// Seed for the per-split feature draw
    pub random_state: u64,
    n_features: usize,
    n_classes: usize,
    feature_importances: Option<Array1<f64>>,
}

/// Best split found for one node
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Data shared by every recursive call of one fit
struct FitContext<'a> {
    x: &'a Array2<f64>,
    y: &'a [usize],
    weights: &'a [f64],
}

impl DecisionTree {
    /// Create a new classifier tree for `n_classes` classes
    pub fn new(n_classes: usize) -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: 0,
            n_features: 0,
            n_classes,
            feature_importances: None,
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

    /// Set number of features tried per split
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit the tree. `weights` holds one positive sample weight per row.
    pub fn fit(&mut self, x: &Array2<f64>, y: &[usize], weights: &[f64]) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() || n_samples != weights.len() {
            return Err(BurnoutError::ShapeError {
                expected: format!("y and weights length = {}", n_samples),
                actual: format!("y length = {}, weights length = {}", y.len(), weights.len()),
            });
        }
        if n_samples == 0 {
            return Err(BurnoutError::TrainingError("cannot fit a tree on zero rows".to_string()));
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= self.n_classes) {
            return Err(BurnoutError::TrainingError(format!(
                "class code {} out of range for {} classes",
                bad, self.n_classes
            )));
        }

        self.n_features = x.ncols();
        let mut importances = vec![0.0; self.n_features];
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        let ctx = FitContext { x, y, weights };

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(&ctx, indices, 0, &mut importances, &mut rng));

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn build_tree(
        &self,
        ctx: &FitContext<'_>,
        indices: Vec<usize>,
        depth: usize,
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let counts = self.class_weights(ctx, &indices);

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || counts.iter().filter(|&&w| w > 0.0).count() <= 1;

        if should_stop {
            return self.leaf(&counts, n_samples);
        }

        let Some(best) = self.find_best_split(ctx, &indices, &counts, rng) else {
            return self.leaf(&counts, n_samples);
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| ctx.x[[i, best.feature_idx]] <= best.threshold);

        if left_indices.len() < self.min_samples_leaf || right_indices.len() < self.min_samples_leaf {
            return self.leaf(&counts, n_samples);
        }

        let node_weight: f64 = counts.iter().sum();
        importances[best.feature_idx] += node_weight * best.gain;
        let impurity = gini(&counts);

        let left = Box::new(self.build_tree(ctx, left_indices, depth + 1, importances, rng));
        let right = Box::new(self.build_tree(ctx, right_indices, depth + 1, importances, rng));

        TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left,
            right,
            n_samples,
            impurity,
        }
    }

    fn find_best_split(
        &self,
        ctx: &FitContext<'_>,
        indices: &[usize],
        parent_counts: &[f64],
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n_features = self.n_features;
        if n_features == 0 {
            return None;
        }
        let n_try = self.max_features.unwrap_or(n_features).clamp(1, n_features);
        // Random visiting order; features past `n_try` are only inspected
        // while no valid split has been found.
        let features = index::sample(rng, n_features, n_features).into_vec();

        let parent_impurity = gini(parent_counts);
        let total_weight: f64 = parent_counts.iter().sum();
        let mut best: Option<SplitCandidate> = None;

        for (visited, feature_idx) in features.into_iter().enumerate() {
            if visited >= n_try && best.is_some() {
                break;
            }
            let mut column: Vec<(f64, usize, f64)> = indices
                .iter()
                .map(|&i| (ctx.x[[i, feature_idx]], ctx.y[i], ctx.weights[i]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = vec![0.0; self.n_classes];
            let mut right = parent_counts.to_vec();
            let mut left_weight = 0.0;

            for pos in 0..column.len().saturating_sub(1) {
                let (value, class, weight) = column[pos];
                left[class] += weight;
                right[class] -= weight;
                left_weight += weight;

                let next = column[pos + 1].0;
                if value >= next {
                    continue;
                }
                let n_left = pos + 1;
                let n_right = column.len() - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let right_weight = total_weight - left_weight;
                let weighted =
                    (left_weight * gini(&left) + right_weight * gini(&right)) / total_weight;
                let gain = parent_impurity - weighted;

                if gain > best.as_ref().map_or(1e-12, |b| b.gain) {
                    let mut threshold = (value + next) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }

    fn class_weights(&self, ctx: &FitContext<'_>, indices: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &i in indices {
            counts[ctx.y[i]] += ctx.weights[i];
        }
        counts
    }

    fn leaf(&self, counts: &[f64], n_samples: usize) -> TreeNode {
        TreeNode::Leaf {
            class: argmax(counts),
            n_samples,
        }
    }

    /// Predict the class of one row
    pub fn predict_row(&self, row: ArrayView1<f64>) -> Result<usize> {
        let root = self.root.as_ref().ok_or(BurnoutError::ModelNotFitted)?;
        if row.len() != self.n_features {
            return Err(BurnoutError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", row.len()),
            });
        }

        let mut node = root;
        loop {
            match node {
                TreeNode::Leaf { class, .. } => return Ok(*class),
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let value = row.get(*feature_idx).ok_or_else(|| {
                        BurnoutError::ConfigError(format!(
                            "split on feature {} but rows have {} features",
                            feature_idx,
                            row.len()
                        ))
                    })?;
                    node = if *value <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    /// Check that every split reads an existing feature and every leaf
    /// holds a class below `n_classes`.
    pub fn check_bounds(&self, n_features: usize, n_classes: usize) -> Result<()> {
        let root = self.root.as_ref().ok_or(BurnoutError::ModelNotFitted)?;
        if self.n_features != n_features {
            return Err(BurnoutError::ConfigError(format!(
                "tree expects {} features, forest has {}",
                self.n_features, n_features
            )));
        }

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node {
                TreeNode::Leaf { class, .. } if *class >= n_classes => {
                    return Err(BurnoutError::ConfigError(format!(
                        "leaf class {} out of range for {} classes",
                        class, n_classes
                    )));
                }
                TreeNode::Leaf { .. } => {}
                TreeNode::Split { feature_idx, .. } if *feature_idx >= n_features => {
                    return Err(BurnoutError::ConfigError(format!(
                        "split feature {} out of range for {} features",
                        feature_idx, n_features
                    )));
                }
                TreeNode::Split { left, right, .. } => {
                    stack.push(&**left);
                    stack.push(&**right);
                }
            }
        }
        Ok(())
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        x.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Get tree depth (a lone leaf has depth 0)
    pub fn get_depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        self.root.as_ref().map_or(0, depth)
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        fn count(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => count(left) + count(right),
            }
        }
        self.root.as_ref().map_or(0, count)
    }
}

/// Gini impurity of weighted class counts
fn gini(counts: &[f64]) -> f64 {
    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|&c| (c / total).powi(2)).sum::<f64>()
}

/// Index of the largest value; ties go to the lowest index.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
