//! Ensemble regression: bagged CART trees averaged at prediction time.
//!
//! The impact predictor is a random forest fitted offline on historical
//! `(battery_temp, ambient_temp, device_state)` rows. Each tree is grown on
//! a bootstrap resample drawn from one seeded RNG, so a given
//! (data, config, seed) triple always yields the identical forest.
//! Prediction takes `&self` and never mutates the model.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Forest shape parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestConfig {
    /// Number of bagged trees.
    pub n_trees: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum samples required to attempt a split.
    pub min_samples_split: usize,
    /// Minimum samples each side of a split must keep.
    pub min_samples_leaf: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 120,
            max_depth: 12,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// A fitted random-forest regressor.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<Node>,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Split candidate found by the variance-reduction scan.
struct BestSplit {
    feature: usize,
    threshold: f64,
    sse: f64,
}

impl RandomForest {
    /// Fit `config.n_trees` trees on bootstrap resamples of `rows`/`targets`.
    ///
    /// `rows` must all share the same width and match `targets` in length.
    /// An empty input produces a degenerate forest that predicts 0.0; callers
    /// that need a hard failure should validate their dataset first.
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], config: &ForestConfig, seed: u64) -> Self {
        debug_assert_eq!(rows.len(), targets.len());

        if rows.is_empty() || targets.is_empty() {
            return Self {
                trees: vec![Node::Leaf { value: 0.0 }],
            };
        }

        let n = rows.len();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut trees = Vec::with_capacity(config.n_trees.max(1));

        for _ in 0..config.n_trees.max(1) {
            let sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
            trees.push(build_node(rows, targets, sample, 0, config));
        }

        Self { trees }
    }

    /// Mean prediction over all trees.
    pub fn predict(&self, features: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| predict_node(t, features)).sum();
        sum / self.trees.len() as f64
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn mean(targets: &[f64], samples: &[usize]) -> f64 {
    let sum: f64 = samples.iter().map(|&i| targets[i]).sum();
    sum / samples.len() as f64
}

fn build_node(
    rows: &[Vec<f64>],
    targets: &[f64],
    samples: Vec<usize>,
    depth: usize,
    config: &ForestConfig,
) -> Node {
    let node_mean = mean(targets, &samples);

    if depth >= config.max_depth || samples.len() < config.min_samples_split.max(2) {
        return Node::Leaf { value: node_mean };
    }

    // Pure node: all targets (numerically) identical.
    if samples
        .iter()
        .all(|&i| (targets[i] - node_mean).abs() < 1e-12)
    {
        return Node::Leaf { value: node_mean };
    }

    let Some(best) = find_best_split(rows, targets, &samples, config) else {
        return Node::Leaf { value: node_mean };
    };

    let (left, right): (Vec<usize>, Vec<usize>) = samples
        .into_iter()
        .partition(|&i| rows[i][best.feature] <= best.threshold);

    if left.is_empty() || right.is_empty() {
        return Node::Leaf { value: node_mean };
    }

    Node::Split {
        feature: best.feature,
        threshold: best.threshold,
        left: Box::new(build_node(rows, targets, left, depth + 1, config)),
        right: Box::new(build_node(rows, targets, right, depth + 1, config)),
    }
}

/// Exhaustive variance-reduction scan over every feature.
///
/// For each feature the sampled values are sorted and every boundary between
/// distinct values is evaluated with prefix sums, so the per-feature cost is
/// one sort plus a linear pass.
fn find_best_split(
    rows: &[Vec<f64>],
    targets: &[f64],
    samples: &[usize],
    config: &ForestConfig,
) -> Option<BestSplit> {
    let n_features = rows[samples[0]].len();
    let min_leaf = config.min_samples_leaf.max(1);
    let mut best: Option<BestSplit> = None;

    for feature in 0..n_features {
        let mut pairs: Vec<(f64, f64)> = samples
            .iter()
            .map(|&i| (rows[i][feature], targets[i]))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = pairs.len();
        let total_sum: f64 = pairs.iter().map(|p| p.1).sum();
        let total_sq: f64 = pairs.iter().map(|p| p.1 * p.1).sum();

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;

        for split_at in 1..n {
            let (value, target) = pairs[split_at - 1];
            left_sum += target;
            left_sq += target * target;

            // Can't split between equal feature values.
            if pairs[split_at].0 <= value {
                continue;
            }
            if split_at < min_leaf || n - split_at < min_leaf {
                continue;
            }

            let left_n = split_at as f64;
            let right_n = (n - split_at) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            if best.as_ref().is_none_or(|b| sse < b.sse) {
                best = Some(BestSplit {
                    feature,
                    threshold: (value + pairs[split_at].0) / 2.0,
                    sse,
                });
            }
        }
    }

    best
}

fn predict_node(node: &Node, features: &[f64]) -> f64 {
    match node {
        Node::Leaf { value } => *value,
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if features[*feature] <= *threshold {
                predict_node(left, features)
            } else {
                predict_node(right, features)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// y = 0.002 * x0 with a second noise-free constant feature.
    fn linear_data(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..n).map(|i| vec![20.0 + i as f64, 1.0]).collect();
        let targets = rows.iter().map(|r| 0.002 * r[0]).collect();
        (rows, targets)
    }

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_trees: 20,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn fit_is_deterministic_for_a_fixed_seed() {
        let (rows, targets) = linear_data(40);
        let a = RandomForest::fit(&rows, &targets, &small_config(), 42);
        let b = RandomForest::fit(&rows, &targets, &small_config(), 42);
        for probe in [21.0, 30.5, 55.0] {
            assert_eq!(a.predict(&[probe, 1.0]), b.predict(&[probe, 1.0]));
        }
    }

    #[test]
    fn different_seeds_resample_differently() {
        let (rows, targets) = linear_data(40);
        let a = RandomForest::fit(&rows, &targets, &small_config(), 1);
        let b = RandomForest::fit(&rows, &targets, &small_config(), 2);
        let differs = [22.3, 37.9, 48.1]
            .iter()
            .any(|&x| a.predict(&[x, 1.0]) != b.predict(&[x, 1.0]));
        assert!(differs);
    }

    #[test]
    fn predictions_track_a_monotonic_signal() {
        let (rows, targets) = linear_data(60);
        let forest = RandomForest::fit(&rows, &targets, &small_config(), 42);
        let cool = forest.predict(&[25.0, 1.0]);
        let hot = forest.predict(&[70.0, 1.0]);
        assert!(
            hot > cool,
            "hot input predicted {hot} <= cool prediction {cool}"
        );
    }

    #[test]
    fn predictions_stay_within_target_range() {
        let (rows, targets) = linear_data(60);
        let forest = RandomForest::fit(&rows, &targets, &small_config(), 42);
        let lo = targets.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = targets.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        // Tree leaves are means of training targets, so any prediction is
        // bounded by the observed target range.
        for x in [0.0, 30.0, 200.0] {
            let p = forest.predict(&[x, 1.0]);
            assert!(p >= lo && p <= hi, "prediction {p} outside [{lo}, {hi}]");
        }
    }

    #[test]
    fn constant_targets_predict_the_constant() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let targets = vec![0.5; 10];
        let forest = RandomForest::fit(&rows, &targets, &small_config(), 3);
        assert!((forest.predict(&[4.2]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_input_degenerates_to_zero() {
        let forest = RandomForest::fit(&[], &[], &ForestConfig::default(), 0);
        assert_eq!(forest.predict(&[1.0, 2.0]), 0.0);
        assert_eq!(forest.n_trees(), 1);
    }

    #[test]
    fn respects_n_trees() {
        let (rows, targets) = linear_data(10);
        let forest = RandomForest::fit(&rows, &targets, &small_config(), 42);
        assert_eq!(forest.n_trees(), 20);
    }
}
