/*!
# Writers module
Contains the logic for writing the output files for the compare and extract commands.
*/
/// Generates the per-set variant count table
pub mod count_summary;
/// Generates BED output covering a computed variant set
pub mod interval_export;
/// Generates the truth-scoring JSON document
pub mod metrics_summary;
/// Generates the overlap JSON document
pub mod overlap_summary;
/// Generates the plot-friendly Jaccard and precision-recall tables
pub mod plot_data;
