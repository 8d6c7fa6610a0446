//! crates/diabetes_core/src/forest.rs
//!
//! A small random-forest classifier for the two-class diabetes problem.
//!
//! Trees are CART trees grown on bootstrap samples with Gini impurity. Each split
//! considers a random subset of `max_features` features (√8 → 2 by default) and
//! sends a sample left when `value <= threshold`. Leaves store the class
//! distribution of the training samples that reached them, and the forest's
//! probability estimate is the mean of the leaf distributions across all trees.
//!
//! Each tree is stored as a flat node arena in pre-order, so a child index is
//! always greater than its parent's. `validate` checks that property, which is
//! what guarantees a walk over a deserialized tree terminates.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::FEATURE_COUNT;

/// One training row.
pub type Sample = [f64; FEATURE_COUNT];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForestError {
    #[error("training set is empty")]
    EmptyTrainingSet,
    #[error("got {samples} samples but {labels} labels")]
    LengthMismatch { samples: usize, labels: usize },
    #[error("label {0} is not a binary class (expected 0 or 1)")]
    InvalidLabel(u8),
    #[error("sample {0} contains a non-finite value")]
    NonFiniteSample(usize),
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error("malformed forest: {0}")]
    Malformed(String),
}

//=========================================================================================
// Hyperparameters
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    /// `None` grows every tree until its leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// `None` means `floor(sqrt(FEATURE_COUNT))`.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            seed: 42,
        }
    }
}

impl ForestParams {
    fn resolved_max_features(&self) -> Result<usize, ForestError> {
        let m = self
            .max_features
            .unwrap_or_else(|| (FEATURE_COUNT as f64).sqrt().floor() as usize);
        if m == 0 || m > FEATURE_COUNT {
            return Err(ForestError::InvalidParams(format!(
                "max_features must be in 1..={FEATURE_COUNT}, got {m}"
            )));
        }
        Ok(m)
    }
}

//=========================================================================================
// Model
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// `[p(class 0), p(class 1)]`
        distribution: [f64; 2],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn leaf_distribution(&self, sample: &Sample) -> Option<[f64; 2]> {
        let mut index = 0;
        loop {
            match self.nodes.get(index)? {
                Node::Leaf { distribution } => return Some(*distribution),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let next = if sample.get(*feature)? <= threshold {
                        *left
                    } else {
                        *right
                    };
                    if next <= index {
                        return None;
                    }
                    index = next;
                }
            }
        }
    }

    fn validate(&self) -> Result<(), ForestError> {
        if self.nodes.is_empty() {
            return Err(ForestError::Malformed("tree has no nodes".into()));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(ForestError::Malformed(format!(
                            "node {index} splits on unknown feature {feature}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ForestError::Malformed(format!(
                            "node {index} has a non-finite threshold"
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(ForestError::Malformed(format!(
                                "node {index} points at invalid child {child}"
                            )));
                        }
                    }
                }
                Node::Leaf { distribution } => {
                    let valid = distribution.iter().all(|p| p.is_finite() && *p >= 0.0)
                        && (distribution[0] + distribution[1] - 1.0).abs() < 1e-6;
                    if !valid {
                        return Err(ForestError::Malformed(format!(
                            "leaf {index} has an invalid class distribution"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Grows a forest on `samples`/`labels` (labels are 0 or 1).
    pub fn fit(
        samples: &[Sample],
        labels: &[u8],
        params: &ForestParams,
    ) -> Result<Self, ForestError> {
        if samples.len() != labels.len() {
            return Err(ForestError::LengthMismatch {
                samples: samples.len(),
                labels: labels.len(),
            });
        }
        if samples.is_empty() {
            return Err(ForestError::EmptyTrainingSet);
        }
        if let Some(bad) = labels.iter().find(|l| **l > 1) {
            return Err(ForestError::InvalidLabel(*bad));
        }
        if let Some(row) = samples
            .iter()
            .position(|s| s.iter().any(|v| !v.is_finite()))
        {
            return Err(ForestError::NonFiniteSample(row));
        }
        if params.n_trees == 0 {
            return Err(ForestError::InvalidParams("n_trees must be at least 1".into()));
        }
        let max_features = params.resolved_max_features()?;

        let mut rng = StdRng::seed_from_u64(params.seed);
        let n = samples.len();
        let trees = (0..params.n_trees)
            .map(|_| {
                let mut tree_rng = StdRng::seed_from_u64(rng.gen());
                let mut indices: Vec<usize> = (0..n).map(|_| tree_rng.gen_range(0..n)).collect();
                let mut builder = TreeBuilder {
                    samples,
                    labels,
                    params,
                    max_features,
                    nodes: Vec::new(),
                };
                builder.grow(&mut indices, 0, &mut tree_rng);
                DecisionTree {
                    nodes: builder.nodes,
                }
            })
            .collect();

        Ok(Self { trees })
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean of the leaf distributions. `None` only for a malformed forest.
    pub fn predict_proba(&self, sample: &Sample) -> Option<[f64; 2]> {
        if self.trees.is_empty() {
            return None;
        }
        let mut sum = [0.0; 2];
        for tree in &self.trees {
            let [p0, p1] = tree.leaf_distribution(sample)?;
            sum[0] += p0;
            sum[1] += p1;
        }
        let n = self.trees.len() as f64;
        Some([sum[0] / n, sum[1] / n])
    }

    /// The most probable class; ties go to class 0.
    pub fn predict(&self, sample: &Sample) -> Option<u8> {
        self.predict_proba(sample)
            .map(|[p0, p1]| if p1 > p0 { 1 } else { 0 })
    }

    /// Fraction of `samples` whose predicted class equals the label.
    pub fn accuracy(&self, samples: &[Sample], labels: &[u8]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let correct = samples
            .iter()
            .zip(labels)
            .filter(|(s, l)| self.predict(s) == Some(**l))
            .count();
        correct as f64 / samples.len() as f64
    }

    /// Structural checks for a forest that came from outside the process.
    pub fn validate(&self) -> Result<(), ForestError> {
        if self.trees.is_empty() {
            return Err(ForestError::Malformed("forest has no trees".into()));
        }
        self.trees.iter().try_for_each(DecisionTree::validate)
    }
}

//=========================================================================================
// Training
//=========================================================================================

struct TreeBuilder<'a> {
    samples: &'a [Sample],
    labels: &'a [u8],
    params: &'a ForestParams,
    max_features: usize,
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl TreeBuilder<'_> {
    /// Grows the subtree for `indices` and returns the index of its root node.
    fn grow(&mut self, indices: &mut [usize], depth: usize, rng: &mut StdRng) -> usize {
        let counts = self.class_counts(indices);
        let slot = self.nodes.len();
        self.nodes.push(Node::Leaf {
            distribution: distribution(counts),
        });

        let pure = counts[0] == 0 || counts[1] == 0;
        let too_deep = self.params.max_depth.is_some_and(|max| depth >= max);
        if pure || too_deep || indices.len() < self.params.min_samples_split {
            return slot;
        }

        let Some(split) = self.best_split(indices, counts, rng) else {
            return slot;
        };

        let mut mid = 0;
        for i in 0..indices.len() {
            if self.samples[indices[i]][split.feature] <= split.threshold {
                indices.swap(i, mid);
                mid += 1;
            }
        }
        let (left_indices, right_indices) = indices.split_at_mut(mid);
        let left = self.grow(left_indices, depth + 1, rng);
        let right = self.grow(right_indices, depth + 1, rng);

        self.nodes[slot] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        slot
    }

    fn class_counts(&self, indices: &[usize]) -> [usize; 2] {
        let mut counts = [0; 2];
        for &i in indices {
            counts[self.labels[i] as usize] += 1;
        }
        counts
    }

    /// Looks at `max_features` random features, keeps looking past that budget
    /// only while no feature has produced a valid split yet.
    fn best_split(
        &self,
        indices: &[usize],
        counts: [usize; 2],
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..FEATURE_COUNT).collect();
        features.shuffle(rng);

        let n = indices.len();
        let mut best: Option<SplitCandidate> = None;
        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }

            let mut column: Vec<(f64, u8)> = indices
                .iter()
                .map(|&i| (self.samples[i][feature], self.labels[i]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = [0usize; 2];
            for k in 0..n - 1 {
                left[column[k].1 as usize] += 1;
                let (lo, hi) = (column[k].0, column[k + 1].0);
                if lo == hi {
                    continue;
                }
                let n_left = k + 1;
                let right = [counts[0] - left[0], counts[1] - left[1]];
                let impurity = (n_left as f64 * gini(left)
                    + (n - n_left) as f64 * gini(right))
                    / n as f64;
                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }
        best
    }
}

fn gini(counts: [usize; 2]) -> f64 {
    let total = (counts[0] + counts[1]) as f64;
    if total == 0.0 {
        return 0.0;
    }
    let p0 = counts[0] as f64 / total;
    let p1 = counts[1] as f64 / total;
    1.0 - p0 * p0 - p1 * p1
}

fn distribution(counts: [usize; 2]) -> [f64; 2] {
    let total = (counts[0] + counts[1]) as f64;
    if total == 0.0 {
        return [1.0, 0.0];
    }
    [counts[0] as f64 / total, counts[1] as f64 / total]
}
