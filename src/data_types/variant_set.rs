
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::data_types::variants::{classify_alleles, VariantKey, VariantKind, VariantRecord};

/// Describes one pipeline's call set before anything is loaded
#[derive(Clone, Debug, Serialize)]
pub struct SetDescriptor {
    /// Path to the bgzip-compressed, indexed variant-call file
    path: PathBuf,
    /// Variant caller that produced the file
    caller: String,
    /// Read mapper that fed the caller
    mapper: String
}

impl SetDescriptor {
    pub fn new(path: PathBuf, caller: String, mapper: String) -> Self {
        Self {
            path, caller, mapper
        }
    }

    /// The stable set label, `{mapper}_{caller}`
    pub fn label(&self) -> String {
        format!("{}_{}", self.mapper, self.caller)
    }

    // getters
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn caller(&self) -> &str {
        &self.caller
    }

    pub fn mapper(&self) -> &str {
        &self.mapper
    }
}

/// Per-set record tallies over the keys eligible for comparison
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SetCounts {
    /// All eligible records
    pub total: usize,
    /// Single-nucleotide substitutions
    pub snps: usize,
    /// Insertions plus deletions; `Other` contributes to the total only
    pub indels: usize
}

/// One pipeline's loaded call set.
/// Immutable once built; the loader guarantees the key set holds one entry per eligible record.
#[derive(Debug)]
pub struct VariantSet {
    /// Stable set label, `{mapper}_{caller}`
    label: String,
    /// The file this set was loaded from
    source_path: PathBuf,
    /// Every decoded record, in file order
    records: Vec<VariantRecord>,
    /// Identity keys eligible for comparison under the session's filter policy
    key_set: FxHashSet<VariantKey>
}

impl VariantSet {
    pub fn new(label: String, source_path: PathBuf, records: Vec<VariantRecord>, key_set: FxHashSet<VariantKey>) -> Self {
        Self {
            label, source_path, records, key_set
        }
    }

    /// Tallies the eligible keys by variant kind.
    /// Counting over the key set rather than the record table keeps these numbers consistent
    /// with every downstream overlap and truth computation.
    pub fn counts(&self) -> SetCounts {
        let mut counts = SetCounts::default();
        for key in self.key_set.iter() {
            counts.total += 1;
            match classify_alleles(key.ref_allele(), key.alt_allele()) {
                VariantKind::Snp => counts.snps += 1,
                VariantKind::Insertion | VariantKind::Deletion => counts.indels += 1,
                VariantKind::Other => {}
            }
        }
        counts
    }

    // getters
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn records(&self) -> &[VariantRecord] {
        &self.records
    }

    pub fn key_set(&self) -> &FxHashSet<VariantKey> {
        &self.key_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::variants::FilterStatus;

    fn build_record(chrom: &str, position: u64, ref_allele: &str, alt_allele: &str) -> VariantRecord {
        VariantRecord::new(
            chrom, position,
            ref_allele.to_string(), alt_allele.to_string(),
            FilterStatus::Pass, None
        ).unwrap()
    }

    #[test]
    fn test_label_convention() {
        let descriptor = SetDescriptor::new(
            PathBuf::from("/data/sample.vcf.gz"),
            "deepvariant".to_string(), "bwa".to_string()
        );
        assert_eq!(descriptor.label(), "bwa_deepvariant");
    }

    #[test]
    fn test_counts_by_kind() {
        let records = vec![
            build_record("1", 100, "A", "T"),
            build_record("1", 200, "A", "ATT"),
            build_record("1", 300, "AGT", "A"),
            build_record("1", 400, "AG", "TC"),
            build_record("2", 100, "C", "G")
        ];
        let key_set: FxHashSet<VariantKey> = records.iter().map(|r| r.key()).collect();
        let variant_set = VariantSet::new(
            "bwa_deepvariant".to_string(), PathBuf::from("/data/sample.vcf.gz"),
            records, key_set
        );

        let counts = variant_set.counts();
        assert_eq!(counts.total, 5);
        assert_eq!(counts.snps, 2);
        assert_eq!(counts.indels, 2);
    }

    #[test]
    fn test_counts_follow_key_set_not_table() {
        // a filtered record stays in the table but never enters the key set
        let pass = build_record("1", 100, "A", "T");
        let filtered = VariantRecord::new(
            "1", 200,
            "C".to_string(), "G".to_string(),
            FilterStatus::Filtered, None
        ).unwrap();

        let key_set: FxHashSet<VariantKey> = [pass.key()].into_iter().collect();
        let variant_set = VariantSet::new(
            "bwa_deepvariant".to_string(), PathBuf::from("/data/sample.vcf.gz"),
            vec![pass, filtered], key_set
        );

        assert_eq!(variant_set.records().len(), 2);
        assert_eq!(variant_set.counts().total, 1);
    }
}
