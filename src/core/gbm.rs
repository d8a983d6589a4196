//! Gradient Boosting Regression
//!
//! Least-squares boosting over shallow regression trees:
//!     F_0(x)  = mean(y)
//!     F_m(x)  = F_{m-1}(x) + learning_rate * h_m(x)
//!
//! where each h_m is a tree fitted to the residuals y - F_{m-1}(x).
//! Splits are chosen to minimise the summed squared error of the two
//! children.

use serde::{Deserialize, Serialize};

use crate::error::{validate_training_shape, AnalysisError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostingConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    /// A node with fewer samples becomes a leaf
    pub min_samples_split: usize,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f64]) -> f64 {
        match self {
            Node::Leaf(value) => *value,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    sse: f64,
}

fn mean_of(indices: &[usize], values: &[f64]) -> f64 {
    indices.iter().map(|&i| values[i]).sum::<f64>() / indices.len() as f64
}

/// Best (feature, threshold) over every midpoint between distinct sorted values
fn best_split(x: &[Vec<f64>], residuals: &[f64], indices: &[usize]) -> Option<SplitCandidate> {
    let width = x[indices[0]].len();
    let total_sum: f64 = indices.iter().map(|&i| residuals[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| residuals[i] * residuals[i]).sum();
    let n = indices.len() as f64;
    let parent_sse = total_sq - total_sum * total_sum / n;

    let mut best: Option<SplitCandidate> = None;
    let mut order = indices.to_vec();

    for feature in 0..width {
        order.sort_by(|&a, &b| {
            x[a][feature]
                .partial_cmp(&x[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 0..order.len() - 1 {
            let r = residuals[order[k]];
            left_sum += r;
            left_sq += r * r;

            let here = x[order[k]][feature];
            let next = x[order[k + 1]][feature];
            if here >= next {
                continue;
            }

            let n_left = (k + 1) as f64;
            let n_right = n - n_left;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / n_left)
                + (right_sq - right_sum * right_sum / n_right);

            // Midpoint can round up to `next` for adjacent floats
            let mut threshold = here + (next - here) / 2.0;
            if threshold >= next {
                threshold = here;
            }

            if sse < parent_sse - 1e-12 && best.as_ref().map_or(true, |b| sse < b.sse) {
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    sse,
                });
            }
        }
    }

    best
}

fn build_tree(
    x: &[Vec<f64>],
    residuals: &[f64],
    indices: &[usize],
    depth: usize,
    config: &BoostingConfig,
) -> Node {
    let leaf = Node::Leaf(mean_of(indices, residuals));
    if depth >= config.max_depth || indices.len() < config.min_samples_split.max(2) {
        return leaf;
    }

    let Some(split) = best_split(x, residuals, indices) else {
        return leaf;
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| x[i][split.feature] <= split.threshold);
    if left.is_empty() || right.is_empty() {
        return leaf;
    }

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(build_tree(x, residuals, &left, depth + 1, config)),
        right: Box::new(build_tree(x, residuals, &right, depth + 1, config)),
    }
}

/// Boosted regression trees with squared loss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    config: BoostingConfig,
    init: f64,
    trees: Vec<Node>,
    n_features: Option<usize>,
}

impl GradientBoostingRegressor {
    pub fn new(config: BoostingConfig) -> Self {
        Self {
            config,
            init: 0.0,
            trees: Vec::new(),
            n_features: None,
        }
    }

    pub fn config(&self) -> &BoostingConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.n_features.is_some()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Fit on a feature matrix and target vector. Refitting discards the
    /// previous ensemble.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), AnalysisError> {
        validate_training_shape(x, y)?;
        if let Some(bad) = x.iter().flatten().chain(y).find(|v| !v.is_finite()) {
            return Err(AnalysisError::InvalidInput(format!(
                "Training data contains a non-finite value: {}",
                bad
            )));
        }

        let n = y.len();
        self.init = y.iter().sum::<f64>() / n as f64;
        self.trees = Vec::with_capacity(self.config.n_estimators);

        let all: Vec<usize> = (0..n).collect();
        let mut current = vec![self.init; n];
        let mut residuals = vec![0.0; n];

        for _ in 0..self.config.n_estimators {
            for i in 0..n {
                residuals[i] = y[i] - current[i];
            }
            let tree = build_tree(x, &residuals, &all, 0, &self.config);
            for (i, row) in x.iter().enumerate() {
                current[i] += self.config.learning_rate * tree.predict(row);
            }
            self.trees.push(tree);
        }

        self.n_features = Some(x[0].len());
        tracing::debug!(
            "Fitted {} trees on {} rows (init = {:.3})",
            self.trees.len(),
            n,
            self.init
        );
        Ok(())
    }

    pub fn predict_one(&self, row: &[f64]) -> Result<f64, AnalysisError> {
        let width = self.n_features.ok_or_else(|| {
            AnalysisError::InvalidInput("Model has not been fitted".to_string())
        })?;
        if row.len() != width {
            return Err(AnalysisError::InvalidInput(format!(
                "Expected {} features, got {}",
                width,
                row.len()
            )));
        }

        Ok(self.init
            + self
                .trees
                .iter()
                .map(|t| self.config.learning_rate * t.predict(row))
                .sum::<f64>())
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, AnalysisError> {
        x.iter().map(|row| self.predict_one(row)).collect()
    }
}

impl Default for GradientBoostingRegressor {
    fn default() -> Self {
        Self::new(BoostingConfig::default())
    }
}
