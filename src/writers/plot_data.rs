

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::data_types::overlap_metrics::PairwiseOverlap;
use crate::data_types::truth_metrics::{TruthMetrics, TruthSummary};

/// Shared csv writer setup for the plot data tables
fn open_table_writer(filename: &Path) -> csv::Result<csv::Writer<File>> {
    // modify the delimiter to "," if it ends with .csv
    let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
    let delimiter: u8 = if is_csv { b',' } else { b'\t' };
    csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(filename)
}

/// Will write the pairwise Jaccard values as a square matrix, one row and column per set.
/// The diagonal is 1.0 for non-empty sets and 0.0 for empty ones, matching the empty-union rule.
/// # Arguments
/// * `set_sizes` - labels and key counts, in presentation order
/// * `pairwise` - pairwise overlaps covering every pair of those labels
/// * `filename` - the filename for the output (tsv/csv)
pub fn write_jaccard_matrix(set_sizes: &[(String, usize)], pairwise: &[PairwiseOverlap], filename: &Path) -> csv::Result<()> {
    let mut jaccard_lookup: FxHashMap<(&str, &str), f64> = Default::default();
    for row in pairwise.iter() {
        jaccard_lookup.insert((row.first_label(), row.second_label()), row.jaccard());
        jaccard_lookup.insert((row.second_label(), row.first_label()), row.jaccard());
    }

    let mut csv_writer = open_table_writer(filename)?;
    let mut header = vec!["pipeline".to_string()];
    header.extend(set_sizes.iter().map(|(label, _)| label.clone()));
    csv_writer.write_record(&header)?;

    for (row_label, row_size) in set_sizes.iter() {
        let mut row = vec![row_label.clone()];
        for (column_label, _) in set_sizes.iter() {
            let jaccard = if row_label == column_label {
                if *row_size > 0 { 1.0 } else { 0.0 }
            } else {
                jaccard_lookup.get(&(row_label.as_str(), column_label.as_str())).copied().unwrap_or(0.0)
            };
            row.push(format!("{jaccard:.6}"));
        }
        csv_writer.write_record(&row)?;
    }

    // save everything
    csv_writer.flush()?;
    Ok(())
}

/// Contains all the data written to each row of the precision-recall table
#[derive(Serialize)]
struct PrecisionRecallRow {
    /// Stable set label
    pipeline: String,
    /// The type of variant represented by this row
    variant_type: String,
    /// Calls present in both the pipeline and the truth set
    true_positives: u64,
    /// Calls present only in the pipeline
    false_positives: u64,
    /// Calls present only in the truth set
    false_negatives: u64,
    /// Precision = TP / (TP + FP)
    precision: f64,
    /// Recall = TP / (TP + FN)
    recall: f64,
    /// F1 = harmonic mean of precision and recall
    f1: f64
}

impl PrecisionRecallRow {
    fn new(pipeline: String, variant_type: String, metrics: &TruthMetrics) -> Self {
        Self {
            pipeline, variant_type,
            true_positives: metrics.true_positives,
            false_positives: metrics.false_positives,
            false_negatives: metrics.false_negatives,
            precision: metrics.precision(),
            recall: metrics.recall(),
            f1: metrics.f1()
        }
    }
}

/// Will write one precision-recall point per pipeline and variant type.
/// Each pipeline gets an ALL row followed by one row per observed kind.
/// # Arguments
/// * `summaries` - per-pipeline summaries, keyed by set label in presentation order
/// * `filename` - the filename for the output (tsv/csv)
pub fn write_precision_recall(summaries: &IndexMap<String, TruthSummary>, filename: &Path) -> csv::Result<()> {
    let mut csv_writer = open_table_writer(filename)?;

    for (label, summary) in summaries.iter() {
        let all_row = PrecisionRecallRow::new(label.clone(), "ALL".to_string(), summary.joint());
        csv_writer.serialize(&all_row)?;

        for (kind, metrics) in summary.by_kind().iter() {
            let kind_row = PrecisionRecallRow::new(label.clone(), kind.to_string(), metrics);
            csv_writer.serialize(&kind_row)?;
        }
    }

    // save everything
    csv_writer.flush()?;
    Ok(())
}
