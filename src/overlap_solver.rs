/*!
# Overlap Solver
Contains the logic for comparing variant key sets against each other.
Pairwise overlaps are computed for every pair of sets; the exclusive region partition is
computed for two-set and three-set comparisons, where each variant lands in exactly one
region based on which sets carry it.
*/
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::data_types::overlap_metrics::{OverlapResult, PairwiseOverlap, RegionCount};
use crate::data_types::variants::VariantKey;

/// Entry point for comparing a collection of key sets.
/// # Arguments
/// * `keyed_sets` - the labeled key sets, in presentation order; callers guarantee at least two
pub fn solve_overlaps(keyed_sets: &[(&str, &FxHashSet<VariantKey>)]) -> OverlapResult {
    let pairwise = solve_pairwise(keyed_sets);
    let partition = if (2..=3).contains(&keyed_sets.len()) {
        solve_partition(keyed_sets)
    } else {
        // no exclusive breakdown beyond three sets, the pairwise table still covers everything
        vec![]
    };
    OverlapResult::new(pairwise, partition)
}

/// Computes the overlap of every set pair
fn solve_pairwise(keyed_sets: &[(&str, &FxHashSet<VariantKey>)]) -> Vec<PairwiseOverlap> {
    let mut pairwise = vec![];
    for (i, j) in (0..keyed_sets.len()).tuple_combinations() {
        let (first_label, first_keys) = keyed_sets[i];
        let (second_label, second_keys) = keyed_sets[j];
        let shared = first_keys.intersection(second_keys).count();
        pairwise.push(PairwiseOverlap::new(
            first_label.to_string(), second_label.to_string(),
            first_keys.len() - shared, second_keys.len() - shared,
            shared
        ));
    }
    pairwise
}

/// Partitions the union of all keys into exclusive regions, one per non-empty set subset.
/// Every subset gets a row even when no variant falls in it.
fn solve_partition(keyed_sets: &[(&str, &FxHashSet<VariantKey>)]) -> Vec<RegionCount> {
    // build up a membership bit mask for each distinct key
    let mut membership: FxHashMap<&VariantKey, u8> = Default::default();
    for (set_index, (_, keys)) in keyed_sets.iter().enumerate() {
        for key in keys.iter() {
            *membership.entry(key).or_insert(0) |= 1 << set_index;
        }
    }

    let mut mask_counts: FxHashMap<u8, usize> = Default::default();
    for mask in membership.values() {
        *mask_counts.entry(*mask).or_insert(0) += 1;
    }

    // exclusives first, then pairs, then the full intersection
    let full_mask = (1_u8 << keyed_sets.len()) - 1;
    let mut ordered_masks: Vec<u8> = (1..=full_mask).collect();
    ordered_masks.sort_by_key(|mask| (mask.count_ones(), *mask));

    let mut partition = vec![];
    for mask in ordered_masks.into_iter() {
        let mut labels = vec![];
        for (set_index, (label, _)) in keyed_sets.iter().enumerate() {
            if mask & (1 << set_index) != 0 {
                labels.push(label.to_string());
            }
        }
        let count = mask_counts.get(&mask).copied().unwrap_or(0);
        partition.push(RegionCount::new(labels, count));
    }
    partition
}
