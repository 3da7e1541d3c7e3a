/// Train/val/test partition arithmetic
///
/// Counts are computed by truncation for train and val; test takes the
/// remainder so the three parts always cover the list exactly once.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::PathBuf;

/// One of the three dataset partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    /// Directory name under the target root
    pub fn dir_name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

/// Number of files in each split for one class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitCounts {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SplitCounts {
    /// `train = floor(n * train_ratio)`, `val = floor(n * val_ratio)`, `test = n - train - val`
    pub fn compute(n_total: usize, train_ratio: f64, val_ratio: f64) -> Self {
        let train = ((n_total as f64 * train_ratio).floor() as usize).min(n_total);
        let val = ((n_total as f64 * val_ratio).floor() as usize).min(n_total - train);
        Self {
            train,
            val,
            test: n_total - train - val,
        }
    }

    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }

    pub fn get(&self, split: Split) -> usize {
        match split {
            Split::Train => self.train,
            Split::Val => self.val,
            Split::Test => self.test,
        }
    }
}

impl std::ops::AddAssign for SplitCounts {
    fn add_assign(&mut self, other: Self) {
        self.train += other.train;
        self.val += other.val;
        self.test += other.test;
    }
}

/// One class's files divided into three disjoint ordered lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitAssignment {
    pub train: Vec<PathBuf>,
    pub val: Vec<PathBuf>,
    pub test: Vec<PathBuf>,
}

impl SplitAssignment {
    /// Slice an already shuffled list by the computed boundaries
    pub fn from_ordered(files: Vec<PathBuf>, train_ratio: f64, val_ratio: f64) -> Self {
        let counts = SplitCounts::compute(files.len(), train_ratio, val_ratio);
        let mut train = files;
        let mut val = train.split_off(counts.train);
        let test = val.split_off(counts.val);
        Self { train, val, test }
    }

    /// Shuffle `files` with `rng`, then slice
    pub fn shuffled(
        mut files: Vec<PathBuf>,
        train_ratio: f64,
        val_ratio: f64,
        rng: &mut StdRng,
    ) -> Self {
        files.shuffle(rng);
        Self::from_ordered(files, train_ratio, val_ratio)
    }

    pub fn files(&self, split: Split) -> &[PathBuf] {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    pub fn counts(&self) -> SplitCounts {
        SplitCounts {
            train: self.train.len(),
            val: self.val.len(),
            test: self.test.len(),
        }
    }
}

/// Seeded generator when a seed is configured, entropy otherwise
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
