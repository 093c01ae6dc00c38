

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::data_types::truth_metrics::{TruthMetrics, TruthSummary};
use crate::util::json_io::save_json;

/// One tally block with its derived scores
#[derive(Serialize)]
struct MetricsEntry {
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

impl MetricsEntry {
    fn new(metrics: &TruthMetrics) -> Self {
        Self {
            true_positives: metrics.true_positives,
            false_positives: metrics.false_positives,
            false_negatives: metrics.false_negatives,
            precision: metrics.precision(),
            recall: metrics.recall(),
            f1: metrics.f1()
        }
    }
}

/// One pipeline's scores in the output document
#[derive(Serialize)]
struct PipelineMetrics {
    /// Stable set label
    pipeline: String,
    /// Scores over all variants
    joint: MetricsEntry,
    /// Scores split by variant kind
    by_kind: BTreeMap<String, MetricsEntry>
}

/// Will write per-pipeline truth scores as a JSON document
/// # Arguments
/// * `summaries` - per-pipeline summaries, keyed by set label in presentation order
/// * `filename` - the filename for the output (.json)
/// # Errors
/// * if opening, serializing, or writing the file throws errors
pub fn write_truth_metrics(summaries: &IndexMap<String, TruthSummary>, filename: &Path) -> anyhow::Result<()> {
    let document: Vec<PipelineMetrics> = summaries.iter()
        .map(|(label, summary)| {
            let by_kind: BTreeMap<String, MetricsEntry> = summary.by_kind().iter()
                .map(|(kind, metrics)| (kind.to_string(), MetricsEntry::new(metrics)))
                .collect();
            PipelineMetrics {
                pipeline: label.clone(),
                joint: MetricsEntry::new(summary.joint()),
                by_kind
            }
        })
        .collect();
    save_json(&document, filename)
}
