
use std::collections::BTreeMap;
use std::ops::AddAssign;

use crate::data_types::variants::VariantKind;

/// Tallies for one pipeline scored against the truth set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TruthMetrics {
    /// Number of pipeline keys found in truth
    pub true_positives: u64,
    /// Number of pipeline keys absent from truth
    pub false_positives: u64,
    /// Number of truth keys absent from the pipeline
    pub false_negatives: u64
}

impl AddAssign for TruthMetrics {
    // Enables += with tallies
    fn add_assign(&mut self, rhs: Self) {
        self.true_positives += rhs.true_positives;
        self.false_positives += rhs.false_positives;
        self.false_negatives += rhs.false_negatives;
    }
}

impl TruthMetrics {
    /// Constructor
    pub fn new(true_positives: u64, false_positives: u64, false_negatives: u64) -> Self {
        Self {
            true_positives, false_positives, false_negatives
        }
    }

    /// Calculates precision, which is relative to the pipeline calls; 0.0 when nothing was called
    pub fn precision(&self) -> f64 {
        let denom = self.true_positives + self.false_positives;
        if denom > 0 {
            self.true_positives as f64 / denom as f64
        } else {
            0.0
        }
    }

    /// Calculates recall, which is relative to truth; 0.0 when truth is empty
    pub fn recall(&self) -> f64 {
        let denom = self.true_positives + self.false_negatives;
        if denom > 0 {
            self.true_positives as f64 / denom as f64
        } else {
            0.0
        }
    }

    /// Calculates the F1 score; 0.0 when precision and recall are both 0
    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        }
    }
}

/// Truth tallies for one pipeline, tracked overall and split by variant kind.
/// TP and FP classify by the pipeline record's kind, FN by the truth record's kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TruthSummary {
    /// Tallies over all eligible records
    joint: TruthMetrics,
    /// Tallies split by variant kind
    by_kind: BTreeMap<VariantKind, TruthMetrics>
}

impl TruthSummary {
    /// Adds a pipeline key that was found in truth
    pub fn add_true_positive(&mut self, kind: VariantKind) {
        self.joint.true_positives += 1;
        self.by_kind.entry(kind).or_default().true_positives += 1;
    }

    /// Adds a pipeline key that was absent from truth
    pub fn add_false_positive(&mut self, kind: VariantKind) {
        self.joint.false_positives += 1;
        self.by_kind.entry(kind).or_default().false_positives += 1;
    }

    /// Adds a truth key that the pipeline missed
    pub fn add_false_negative(&mut self, kind: VariantKind) {
        self.joint.false_negatives += 1;
        self.by_kind.entry(kind).or_default().false_negatives += 1;
    }

    // getters
    pub fn joint(&self) -> &TruthMetrics {
        &self.joint
    }

    pub fn by_kind(&self) -> &BTreeMap<VariantKind, TruthMetrics> {
        &self.by_kind
    }
}

impl AddAssign<&Self> for TruthSummary {
    // Enables += for per-kind tallies, mostly calling AddAssign on TruthMetrics repeatedly
    fn add_assign(&mut self, rhs: &Self) {
        self.joint += rhs.joint;
        for (kind, metrics) in rhs.by_kind.iter() {
            let entry = self.by_kind.entry(*kind).or_default();
            *entry += *metrics;
        }
    }
}
