/*!
# Truth Solver
Contains the logic for scoring a pipeline's calls against a truth set.
Matching is by exact identity key; a shared key is a true positive, a pipeline-only key a
false positive, and a truth-only key a false negative. When confidence regions are supplied,
variants on both sides must be fully contained in one region to be scored at all.
*/

use crate::data_types::truth_metrics::TruthSummary;
use crate::data_types::variant_set::VariantSet;
use crate::data_types::variants::{classify_alleles, VariantKey};
use crate::parsing::confidence_regions::ConfidenceRegions;

/// Entry point for scoring one pipeline set against the truth.
/// # Arguments
/// * `pipeline_set` - the calls under evaluation
/// * `truth_set` - the benchmark calls
/// * `confidence_regions` - optional restriction applied to both sides before scoring
pub fn score_against_truth(
    pipeline_set: &VariantSet, truth_set: &VariantSet,
    confidence_regions: Option<&ConfidenceRegions>
) -> TruthSummary {
    let mut summary = TruthSummary::default();
    let truth_keys = truth_set.key_set();

    for key in pipeline_set.key_set().iter() {
        if !key_in_confidence(key, confidence_regions) {
            continue;
        }
        let kind = classify_alleles(key.ref_allele(), key.alt_allele());
        if truth_keys.contains(key) {
            summary.add_true_positive(kind);
        } else {
            summary.add_false_positive(kind);
        }
    }

    for key in truth_keys.iter() {
        if !key_in_confidence(key, confidence_regions) {
            continue;
        }
        if !pipeline_set.key_set().contains(key) {
            summary.add_false_negative(classify_alleles(key.ref_allele(), key.alt_allele()));
        }
    }

    summary
}

/// True when the key's full reference span sits inside a single confidence region.
/// With no regions configured, every key is in scope.
fn key_in_confidence(key: &VariantKey, confidence_regions: Option<&ConfidenceRegions>) -> bool {
    match confidence_regions {
        Some(regions) => {
            let (start, end) = key.reference_span();
            regions.contains_span(key.chromosome(), start as i32, end as i32 - 1)
        },
        None => true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use rustc_hash::FxHashSet;
    use std::path::PathBuf;

    use crate::data_types::variants::{FilterStatus, VariantKind, VariantRecord};

    fn build_set(label: &str, alleles: &[(u64, &str, &str)]) -> VariantSet {
        let records: Vec<VariantRecord> = alleles.iter()
            .map(|&(position, ref_allele, alt_allele)| {
                VariantRecord::new(
                    "1", position,
                    ref_allele.to_string(), alt_allele.to_string(),
                    FilterStatus::Pass, None
                ).unwrap()
            })
            .collect();
        let key_set: FxHashSet<_> = records.iter().map(|r| r.key()).collect();
        VariantSet::new(label.to_string(), PathBuf::from("test.vcf.gz"), records, key_set)
    }

    #[test]
    fn test_balanced_scenario() {
        // one shared call, one pipeline-only, one truth-only
        let pipeline_set = build_set("bwa_deepvariant", &[(100, "A", "T"), (200, "C", "G")]);
        let truth_set = build_set("truth", &[(100, "A", "T"), (300, "G", "A")]);

        let summary = score_against_truth(&pipeline_set, &truth_set, None);
        let metrics = summary.joint();
        assert_eq!(metrics.true_positives, 1);
        assert_eq!(metrics.false_positives, 1);
        assert_eq!(metrics.false_negatives, 1);
        assert_approx_eq!(metrics.precision(), 0.5);
        assert_approx_eq!(metrics.recall(), 0.5);
        assert_approx_eq!(metrics.f1(), 0.5);
    }

    #[test]
    fn test_perfect_agreement() {
        let pipeline_set = build_set("bwa_deepvariant", &[(100, "A", "T"), (200, "C", "G")]);
        let truth_set = build_set("truth", &[(100, "A", "T"), (200, "C", "G")]);

        let summary = score_against_truth(&pipeline_set, &truth_set, None);
        let metrics = summary.joint();
        assert_eq!(metrics.true_positives, 2);
        assert_eq!(metrics.false_positives, 0);
        assert_eq!(metrics.false_negatives, 0);
        assert_approx_eq!(metrics.f1(), 1.0);
    }

    #[test]
    fn test_empty_sets_score_zero() {
        let pipeline_set = build_set("bwa_deepvariant", &[]);
        let truth_set = build_set("truth", &[]);

        let summary = score_against_truth(&pipeline_set, &truth_set, None);
        let metrics = summary.joint();
        assert_approx_eq!(metrics.precision(), 0.0);
        assert_approx_eq!(metrics.recall(), 0.0);
        assert_approx_eq!(metrics.f1(), 0.0);
    }

    #[test]
    fn test_by_kind_breakdown() {
        // SNP agrees, insertion is pipeline-only, deletion is truth-only
        let pipeline_set = build_set("bwa_deepvariant", &[(100, "A", "T"), (200, "C", "CTT")]);
        let truth_set = build_set("truth", &[(100, "A", "T"), (300, "GAC", "G")]);

        let summary = score_against_truth(&pipeline_set, &truth_set, None);
        let by_kind = summary.by_kind();
        assert_eq!(by_kind[&VariantKind::Snp].true_positives, 1);
        assert_eq!(by_kind[&VariantKind::Insertion].false_positives, 1);
        assert_eq!(by_kind[&VariantKind::Deletion].false_negatives, 1);
        assert!(!by_kind.contains_key(&VariantKind::Other));
    }

    #[test]
    fn test_confidence_region_filtering() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let bed_fn = temp_dir.path().join("confidence.bed");
        // covers 1:91-110 in 1-based terms
        std::fs::write(&bed_fn, "1\t90\t110\n").unwrap();
        let regions = ConfidenceRegions::from_bed(&bed_fn).unwrap();

        // the shared SNP is inside; a pipeline-only call at 200 and a truth-only
        // deletion poking past the region end are both out of scope
        let pipeline_set = build_set("bwa_deepvariant", &[(100, "A", "T"), (200, "C", "G")]);
        let truth_set = build_set("truth", &[(100, "A", "T"), (105, "CAGTCAG", "C")]);

        let summary = score_against_truth(&pipeline_set, &truth_set, Some(&regions));
        let metrics = summary.joint();
        assert_eq!(metrics.true_positives, 1);
        assert_eq!(metrics.false_positives, 0);
        assert_eq!(metrics.false_negatives, 0);
    }

    #[test]
    fn test_confidence_region_boundaries() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let bed_fn = temp_dir.path().join("confidence.bed");
        std::fs::write(&bed_fn, "1\t99\t199\n").unwrap();
        let regions = ConfidenceRegions::from_bed(&bed_fn).unwrap();

        // the half-open row covers 1-based positions 100 through 199, so the call at 100
        // is the first base in scope and the calls at 200 fall out on both sides
        let pipeline_set = build_set("bwa_deepvariant", &[(100, "A", "T"), (200, "C", "G")]);
        let truth_set = build_set("truth", &[(100, "A", "T"), (200, "C", "G")]);

        let summary = score_against_truth(&pipeline_set, &truth_set, Some(&regions));
        assert_eq!(summary.joint().true_positives, 1);
        assert_eq!(summary.joint().false_negatives, 0);
    }
}
