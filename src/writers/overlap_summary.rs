

use serde::Serialize;
use std::path::Path;

use crate::data_types::overlap_metrics::OverlapResult;
use crate::util::json_io::save_json;

/// One pairwise comparison in the summary document
#[derive(Serialize)]
struct PairwiseRow {
    /// First set label of the pair
    first: String,
    /// Second set label of the pair
    second: String,
    /// Variants found only in the first set
    only_in_first: usize,
    /// Variants found only in the second set
    only_in_second: usize,
    /// Variants found in both sets
    shared: usize,
    /// Jaccard similarity of the pair
    jaccard_similarity: f64
}

/// One exclusive region in the summary document
#[derive(Serialize)]
struct ExclusiveRegionRow {
    /// The sets that carry these variants, and no others
    sets: Vec<String>,
    /// Number of variants exclusive to this combination
    exclusive_count: usize
}

/// The full overlap summary document
#[derive(Serialize)]
struct OverlapSummary {
    /// All pairwise comparisons
    pairwise: Vec<PairwiseRow>,
    /// Exclusive region breakdown; empty beyond three sets
    exclusive_regions: Vec<ExclusiveRegionRow>
}

/// Will write the overlap results as a JSON document
/// # Arguments
/// * `overlap_result` - pairwise and partition results from the comparison
/// * `filename` - the filename for the output (.json)
/// # Errors
/// * if opening, serializing, or writing the file throws errors
pub fn write_overlap_summary(overlap_result: &OverlapResult, filename: &Path) -> anyhow::Result<()> {
    let pairwise: Vec<PairwiseRow> = overlap_result.pairwise().iter()
        .map(|row| PairwiseRow {
            first: row.first_label().to_string(),
            second: row.second_label().to_string(),
            only_in_first: row.only_first(),
            only_in_second: row.only_second(),
            shared: row.shared(),
            jaccard_similarity: row.jaccard()
        })
        .collect();

    let exclusive_regions: Vec<ExclusiveRegionRow> = overlap_result.partition().iter()
        .map(|region| ExclusiveRegionRow {
            sets: region.labels().to_vec(),
            exclusive_count: region.count()
        })
        .collect();

    let summary = OverlapSummary {
        pairwise,
        exclusive_regions
    };
    save_json(&summary, filename)
}
