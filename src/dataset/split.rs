//! Seeded train/test partitioning.
//!
//! The same options and row count always produce the same partition.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    #[error("Test size must be in (0, 1), got {0}")]
    InvalidTestSize(f64),
    #[error("Cannot split an empty dataset")]
    EmptyDataset,
    #[error("Test size {test_size} leaves an empty train subset for {rows} rows")]
    EmptyTrain { rows: usize, test_size: f64 },
}

/// How rows are partitioned into train and test subsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    /// Fraction of rows assigned to the test subset.
    pub test_size: f64,
    /// Seed for the row permutation.
    pub seed: u64,
    /// Keep class proportions in both subsets.
    pub stratify: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            test_size: 0.33,
            seed: 42,
            stratify: false,
        }
    }
}

/// Disjoint train/test row indices covering the whole dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl Split {
    /// Copy `values` into `(train, test)` subsets following this split.
    pub fn partition<T: Clone>(&self, values: &[T]) -> (Vec<T>, Vec<T>) {
        let pick = |indices: &[usize]| -> Vec<T> {
            indices
                .iter()
                .filter_map(|&idx| values.get(idx).cloned())
                .collect()
        };
        (pick(&self.train), pick(&self.test))
    }
}

/// `(n_train, n_test)` for `rows` rows.
///
/// The test side rounds up, so any valid `test_size` leaves at least one test row.
pub fn split_counts(rows: usize, test_size: f64) -> Result<(usize, usize), SplitError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(SplitError::InvalidTestSize(test_size));
    }
    if rows == 0 {
        return Err(SplitError::EmptyDataset);
    }
    let n_test = (test_size * rows as f64).ceil() as usize;
    let n_train = rows.saturating_sub(n_test);
    if n_train == 0 {
        return Err(SplitError::EmptyTrain { rows, test_size });
    }
    Ok((n_train, n_test))
}

/// Randomly partition `rows` row indices.
///
/// The test subset is the head of a seeded permutation, the train subset its tail.
pub fn train_test_split(rows: usize, options: &SplitOptions) -> Result<Split, SplitError> {
    let (_, n_test) = split_counts(rows, options.test_size)?;
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut order: Vec<usize> = (0..rows).collect();
    order.shuffle(&mut rng);
    let train = order.split_off(n_test);
    Ok(Split { train, test: order })
}

/// Partition rows so each class keeps its share in both subsets.
///
/// The test budget is divided across classes by largest remainder (ties go to
/// the smaller class label), then both subsets are shuffled.
pub fn stratified_split<L: Ord>(labels: &[L], options: &SplitOptions) -> Result<Split, SplitError> {
    let rows = labels.len();
    let (_, n_test) = split_counts(rows, options.test_size)?;
    let mut rng = StdRng::seed_from_u64(options.seed);

    let mut by_class: BTreeMap<&L, Vec<usize>> = BTreeMap::new();
    for (idx, label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(idx);
    }

    let mut quotas: Vec<(usize, f64)> = by_class
        .values()
        .map(|members| {
            let exact = members.len() as f64 * n_test as f64 / rows as f64;
            (exact.floor() as usize, exact - exact.floor())
        })
        .collect();
    let assigned: usize = quotas.iter().map(|(q, _)| q).sum();
    let mut by_remainder: Vec<usize> = (0..quotas.len()).collect();
    by_remainder.sort_by(|&a, &b| quotas[b].1.total_cmp(&quotas[a].1));
    for &class_idx in by_remainder.iter().take(n_test.saturating_sub(assigned)) {
        quotas[class_idx].0 += 1;
    }

    let mut train = Vec::with_capacity(rows - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (mut members, (quota, _)) in by_class.into_values().zip(quotas) {
        members.shuffle(&mut rng);
        let tail = members.split_off(quota.min(members.len()));
        test.extend(members);
        train.extend(tail);
    }
    test.shuffle(&mut rng);
    train.shuffle(&mut rng);
    Ok(Split { train, test })
}
