//! Isolation forest over a single numeric feature.

use rand::{seq::index, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use waterguard_client::domain::AnomalyLabel;

use super::{AnomalyError, OutlierModel};

pub const DEFAULT_TREES: usize = 100;
pub const DEFAULT_MAX_SAMPLES: usize = 256;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone)]
enum Node {
    Split { threshold: f64, left: usize, right: usize },
    Leaf { size: usize },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn build<R: Rng>(sample: &mut [f64], height_limit: usize, rng: &mut R) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(sample, 0, height_limit, rng);
        tree
    }

    fn grow<R: Rng>(&mut self, sample: &mut [f64], depth: usize, height_limit: usize, rng: &mut R) -> usize {
        let id = self.nodes.len();
        let (min, max) = min_max(sample);

        if depth >= height_limit || sample.len() <= 1 || min >= max {
            self.nodes.push(Node::Leaf { size: sample.len() });
            return id;
        }

        let threshold = rng.gen_range(min..max);
        self.nodes.push(Node::Leaf { size: 0 });

        let split = partition(sample, threshold);
        let (lo, hi) = sample.split_at_mut(split);
        let left = self.grow(lo, depth + 1, height_limit, rng);
        let right = self.grow(hi, depth + 1, height_limit, rng);
        self.nodes[id] = Node::Split { threshold, left, right };
        id
    }

    fn path_length(&self, x: f64) -> f64 {
        let mut id = 0;
        let mut depth = 0.0;
        loop {
            match self.nodes[id] {
                Node::Split { threshold, left, right } => {
                    id = if x <= threshold { left } else { right };
                    depth += 1.0;
                }
                Node::Leaf { size } => return depth + average_path_length(size),
            }
        }
    }
}

/// Unsupervised outlier detector that scores points by how few random
/// splits it takes to isolate them.
///
/// The decision offset is the `contamination` percentile of the training
/// scores, so roughly that fraction of the training data is labeled
/// `Anomaly`. Ties at the offset stay `Normal`.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: usize,
    max_samples: usize,
    contamination: f64,
    seed: u64,
    forest: Vec<IsolationTree>,
    sample_size: usize,
    offset: f64,
}

impl IsolationForest {
    pub fn new(contamination: f64, seed: u64) -> Self {
        Self {
            trees: DEFAULT_TREES,
            max_samples: DEFAULT_MAX_SAMPLES,
            contamination,
            seed,
            forest: Vec::new(),
            sample_size: 0,
            offset: 0.0,
        }
    }

    /// Decision offset learned at fit time, in `score_samples` units.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    fn anomaly_score(&self, x: f64) -> f64 {
        let norm = average_path_length(self.sample_size);
        let mean_depth =
            self.forest.iter().map(|t| t.path_length(x)).sum::<f64>() / self.forest.len() as f64;
        if norm == 0.0 {
            0.5
        } else {
            2f64.powf(-mean_depth / norm)
        }
    }
}

impl OutlierModel for IsolationForest {
    fn fit(&mut self, data: &[f64]) -> Result<(), AnomalyError> {
        if data.is_empty() {
            return Err(AnomalyError::InsufficientData { required: 1, got: 0 });
        }
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            return Err(AnomalyError::NonFiniteValue { index: pos });
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(AnomalyError::InvalidParameter {
                name: "contamination".to_string(),
                reason: format!("must be in (0, 0.5], got {}", self.contamination),
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let sample_size = self.max_samples.min(data.len());
        let height_limit = (sample_size.max(2) as f64).log2().ceil() as usize;

        let mut forest = Vec::with_capacity(self.trees);
        for _ in 0..self.trees {
            let mut sample: Vec<f64> = index::sample(&mut rng, data.len(), sample_size)
                .iter()
                .map(|i| data[i])
                .collect();
            forest.push(IsolationTree::build(&mut sample, height_limit, &mut rng));
        }

        self.forest = forest;
        self.sample_size = sample_size;
        self.offset = 0.0;

        let train_scores = self.score_samples(data)?;
        self.offset = percentile(&train_scores, 100.0 * self.contamination);
        Ok(())
    }

    /// Negated anomaly scores: lower means more abnormal.
    fn score_samples(&self, data: &[f64]) -> Result<Vec<f64>, AnomalyError> {
        if !self.is_fitted() {
            return Err(AnomalyError::NotFitted);
        }
        Ok(data.iter().map(|&x| -self.anomaly_score(x)).collect())
    }

    fn predict(&self, data: &[f64]) -> Result<Vec<AnomalyLabel>, AnomalyError> {
        let offset = self.offset;
        Ok(self
            .score_samples(data)?
            .into_iter()
            .map(|s| if s < offset { AnomalyLabel::Anomaly } else { AnomalyLabel::Normal })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        !self.forest.is_empty()
    }
}

/// Average path length of an unsuccessful BST search over `n` points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Moves values `<= threshold` to the front; returns how many there are.
fn partition(values: &mut [f64], threshold: f64) -> usize {
    let mut split = 0;
    for i in 0..values.len() {
        if values[i] <= threshold {
            values.swap(i, split);
            split += 1;
        }
    }
    split
}

/// Percentile with linear interpolation between closest ranks.
fn percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
