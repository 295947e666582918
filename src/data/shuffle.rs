use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::model::{check_rows, Dataset};
use crate::error::Result;

/// Seeded row permutation of `0..n_rows`.
pub fn permutation(n_rows: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices
}

/// Row-permuted copies of `features` and `targets`, both reordered by the
/// same permutation so every row keeps its target.
pub fn shuffle(
    features: ArrayView2<'_, f64>,
    targets: ArrayView1<'_, f64>,
    seed: u64,
) -> Result<(Array2<f64>, Array1<f64>)> {
    check_rows(features, targets)?;
    let order = permutation(targets.len(), seed);
    Ok((
        features.select(Axis(0), &order),
        targets.select(Axis(0), &order),
    ))
}

impl Dataset {
    pub fn shuffled(&self, seed: u64) -> Result<Dataset> {
        let (features, targets) = shuffle(self.features.view(), self.targets.view(), seed)?;
        Ok(self.with_rows(features, targets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn pairs(x: &Array2<f64>, y: &Array1<f64>) -> Vec<(Vec<u64>, u64)> {
        let mut out: Vec<(Vec<u64>, u64)> = x
            .outer_iter()
            .zip(y.iter())
            .map(|(row, &t)| (row.iter().map(|v| v.to_bits()).collect(), t.to_bits()))
            .collect();
        out.sort();
        out
    }

    #[test]
    fn same_seed_same_order() {
        let x = array![[0.0, 1.0], [1.0, 1.0], [0.0, 2.0], [1.0, 2.0]];
        let y = array![10.0, 20.0, 30.0, 40.0];
        let a = shuffle(x.view(), y.view(), 0).unwrap();
        let b = shuffle(x.view(), y.view(), 0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn keeps_rows_paired_with_targets() {
        let x = Array2::from_shape_fn((50, 3), |(r, c)| (r * 3 + c) as f64);
        let y = Array1::from_shape_fn(50, |r| r as f64 * 10.0);
        for seed in [0, 1, 7, 12345] {
            let (xs, ys) = shuffle(x.view(), y.view(), seed).unwrap();
            assert_eq!(pairs(&xs, &ys), pairs(&x, &y));
            for (row, &t) in xs.outer_iter().zip(ys.iter()) {
                assert_eq!(row[0] / 3.0 * 10.0, t);
            }
        }
    }

    #[test]
    fn permutation_is_a_bijection() {
        let mut p = permutation(100, 3);
        p.sort_unstable();
        assert_eq!(p, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn rejects_row_mismatch() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0];
        assert!(shuffle(x.view(), y.view(), 0).is_err());
    }
}
