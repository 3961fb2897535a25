use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tabeval::FeatureTable;

/// `rows` samples spread evenly over `classes` classes.
///
/// Feature 0 carries the class signal, feature 1 is noise.
pub fn blobs(rows: usize, classes: usize, seed: u64) -> (FeatureTable, Vec<i64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut x = Vec::with_capacity(rows);
    let mut y = Vec::with_capacity(rows);
    for i in 0..rows {
        let class = i % classes;
        let center = class as f64 * 4.0;
        x.push(vec![
            center + rng.random::<f64>() - 0.5,
            rng.random::<f64>() * 10.0,
        ]);
        y.push(class as i64);
    }
    (FeatureTable::from_rows(x).expect("rectangular rows"), y)
}

/// Noisy linear target `y = 3 * x0 - 2 * x1 + 1`.
pub fn linear(rows: usize, seed: u64) -> (FeatureTable, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut x = Vec::with_capacity(rows);
    let mut y = Vec::with_capacity(rows);
    for _ in 0..rows {
        let a = rng.random::<f64>() * 10.0;
        let b = rng.random::<f64>() * 10.0;
        let noise = (rng.random::<f64>() - 0.5) * 0.1;
        x.push(vec![a, b]);
        y.push(3.0 * a - 2.0 * b + 1.0 + noise);
    }
    (FeatureTable::from_rows(x).expect("rectangular rows"), y)
}
