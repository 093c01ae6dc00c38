/// Contains the overlap tallies and partition regions produced by set comparison
pub mod overlap_metrics;
/// Contains tracker for TP, FP, FN and derived metrics
pub mod truth_metrics;
/// Contains the variant set container and pipeline descriptors
pub mod variant_set;
/// Contains variant definition functionality and checks
pub mod variants;
