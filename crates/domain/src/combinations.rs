//! Pairwise combinations of indexed values
//!
//! Used to expand a list of locations into all origin/destination pairs
//! for bulk routing, and to rebuild the row order of a routing matrix.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// One row of a pairwise-combination table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination<A, B = A> {
    /// Value taken from the first list
    pub input1: A,
    /// Value taken from the second list
    pub input2: B,
    /// 0-based position of `input1` in the first list
    pub index1: usize,
    /// 0-based position of `input2` in the second list
    pub index2: usize,
}

/// Filters applied when a list is paired with itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationOptions {
    /// Keep only one direction of symmetric pairs (`index1 <= index2`)
    pub unique: bool,
    /// Keep pairs of an item with itself (`index1 == index2`)
    pub include_same: bool,
}

impl Default for CombinationOptions {
    fn default() -> Self {
        Self {
            unique: true,
            include_same: false,
        }
    }
}

/// Cartesian product of two lists with each element's 0-based index
///
/// Rows come out ordered by `(index1, index2)`.
pub fn indexed_product<A: Clone, B: Clone>(first: &[A], second: &[B]) -> Vec<Combination<A, B>> {
    first
        .iter()
        .enumerate()
        .cartesian_product(second.iter().enumerate())
        .map(|((index1, input1), (index2, input2))| Combination {
            input1: input1.clone(),
            input2: input2.clone(),
            index1,
            index2,
        })
        .collect()
}

/// All pairwise combinations of `data` with `data_to`, or with itself
///
/// The `unique`/`include_same` filters only apply when `data_to` is `None`;
/// two distinct lists always keep every combination.
pub fn all_combinations<T: Clone>(
    data: &[T],
    data_to: Option<&[T]>,
    options: CombinationOptions,
) -> Vec<Combination<T>> {
    let Some(data_to) = data_to else {
        return indexed_product(data, data)
            .into_iter()
            .filter(|row| !options.unique || row.index1 <= row.index2)
            .filter(|row| options.include_same || row.index1 != row.index2)
            .collect();
    };

    indexed_product(data, data_to)
}
