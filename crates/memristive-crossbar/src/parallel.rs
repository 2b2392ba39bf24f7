//! Tile-parallel execution using rayon.
//!
//! Tiles own their devices exclusively, so per-tile work needs no locking.
//! Small mappings run sequentially; rayon's scheduling overhead dominates
//! below a handful of tiles.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for tile-parallel execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Minimum number of work items before switching to parallel execution.
    pub min_items_for_parallel: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            min_items_for_parallel: 2,
        }
    }
}

impl ParallelConfig {
    /// Config that always runs sequentially.
    pub fn sequential() -> Self {
        Self {
            min_items_for_parallel: usize::MAX,
        }
    }

    /// Set the minimum parallel threshold.
    pub fn with_min_parallel(mut self, min: usize) -> Self {
        self.min_items_for_parallel = min;
        self
    }

    /// Whether `count` items should be processed in parallel.
    pub fn use_parallel(&self, count: usize) -> bool {
        count >= self.min_items_for_parallel && rayon::current_num_threads() > 1
    }

    /// Map `f` over `items`, in parallel when worthwhile. Output order matches input order.
    pub fn map_mut<T, R, F>(&self, items: &mut [T], f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(&mut T) -> R + Sync + Send,
    {
        if self.use_parallel(items.len()) {
            items.par_iter_mut().map(f).collect()
        } else {
            items.iter_mut().map(f).collect()
        }
    }

    /// Map `f` over `items` by shared reference, in parallel when worthwhile.
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        if self.use_parallel(items.len()) {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}
