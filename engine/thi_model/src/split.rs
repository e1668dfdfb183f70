//! Seeded train / held-out partitioning.

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::SplitError;

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Row indices of each partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..len` and hold out `ceil(test_fraction * len)` rows.
///
/// Both partitions must end up non-empty.
pub fn train_test_split(len: usize, test_fraction: f64, seed: u64) -> Result<Split, SplitError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(SplitError::InvalidFraction(test_fraction));
    }
    let n_test = (test_fraction * len as f64).ceil() as usize;
    let n_train = len.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(SplitError::Degenerate {
            len,
            train: n_train,
            test: n_test,
        });
    }

    let mut rows: Vec<usize> = (0..len).collect();
    rows.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = rows.split_off(n_test);
    debug!("split {len} rows into {} train / {} held out", train.len(), rows.len());
    Ok(Split { train, test: rows })
}
