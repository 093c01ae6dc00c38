
use serde::Serialize;

use crate::parsing::chromosomes::normalize_chromosome;

/// The variant classes we distinguish when counting and reporting
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, strum_macros::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum VariantKind {
    /// REF and ALT are both length = 1
    Snp=0,
    /// REF length = 1, ALT length > 1
    Insertion,
    /// REF length > 1, ALT length = 1
    Deletion,
    /// Everything else: multi-base substitutions, symbolic or breakend alleles
    Other // make sure Other is always the last one in the list
}

/// Filter annotation of a source record, reduced to the three states we act on
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, strum_macros::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum FilterStatus {
    /// The record cleared the caller's internal filters
    Pass=0,
    /// One or more non-PASS filter values were set
    Filtered,
    /// The record carries no filter annotation (".")
    Unknown
}

#[derive(thiserror::Error, Debug)]
pub enum VariantError {
    #[error("alternate allele is empty (length = 0)")]
    EmptyAltAllele,
    #[error("chromosome token is empty")]
    EmptyChromosome,
    #[error("reference allele is empty (length = 0)")]
    EmptyRefAllele,
    #[error("position must be >= 1 (coordinates are 1-based)")]
    ZeroPosition
}

/// The identity of a variant for set membership.
/// Two records are the same variant iff chromosome, position, and both alleles match exactly;
/// there is no positional tolerance and no haplotype-aware reconciliation.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct VariantKey {
    /// Normalized chromosome token
    chromosome: String,
    /// 1-based position from the source record
    position: u64,
    /// Reference allele, verbatim
    ref_allele: String,
    /// A single alternate allele, verbatim
    alt_allele: String
}

impl VariantKey {
    pub fn new(chromosome: String, position: u64, ref_allele: String, alt_allele: String) -> Self {
        Self {
            chromosome, position, ref_allele, alt_allele
        }
    }

    /// Returns the 0-based, half-open interval covered by the reference allele.
    /// This is the span written to interval exports.
    pub fn reference_span(&self) -> (u64, u64) {
        let start = self.position.saturating_sub(1);
        let end = start + self.ref_allele.len() as u64;
        (start, end)
    }

    // getters
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn ref_allele(&self) -> &str {
        &self.ref_allele
    }

    pub fn alt_allele(&self) -> &str {
        &self.alt_allele
    }
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}>{}", self.chromosome, self.position, self.ref_allele, self.alt_allele)
    }
}

/// One normalized variant call from a source file.
/// A multi-allelic source row is split into one record per alternate allele before this is built.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariantRecord {
    /// Normalized chromosome token
    chromosome: String,
    /// 1-based position from the source record
    position: u64,
    /// Reference allele, verbatim
    ref_allele: String,
    /// A single alternate allele, verbatim
    alt_allele: String,
    /// Classification derived from the allele lengths
    variant_kind: VariantKind,
    /// Reduced filter annotation
    filter_status: FilterStatus,
    /// First-sample genotype rendered with the original separators, when present
    genotype: Option<String>
}

impl VariantRecord {
    /// Creates a new record, normalizing the chromosome token and deriving the variant kind.
    /// # Arguments
    /// * `chromosome` - contig token as it appears in the source; normalized here
    /// * `position` - 1-based coordinate
    /// * `ref_allele` - reference allele sequence
    /// * `alt_allele` - one alternate allele; symbolic alleles are kept verbatim
    /// * `filter_status` - reduced filter annotation
    /// * `genotype` - first-sample genotype string, if any
    /// # Errors
    /// * if the chromosome token or either allele is empty
    /// * if the position is 0
    pub fn new(
        chromosome: &str, position: u64,
        ref_allele: String, alt_allele: String,
        filter_status: FilterStatus, genotype: Option<String>
    ) -> Result<VariantRecord, VariantError> {
        if chromosome.is_empty() {
            return Err(VariantError::EmptyChromosome);
        }
        if position == 0 {
            return Err(VariantError::ZeroPosition);
        }
        if ref_allele.is_empty() {
            return Err(VariantError::EmptyRefAllele);
        }
        if alt_allele.is_empty() {
            return Err(VariantError::EmptyAltAllele);
        }

        let variant_kind = classify_alleles(&ref_allele, &alt_allele);
        Ok(VariantRecord {
            chromosome: normalize_chromosome(chromosome),
            position,
            ref_allele,
            alt_allele,
            variant_kind,
            filter_status,
            genotype
        })
    }

    /// Returns the identity key for set membership
    pub fn key(&self) -> VariantKey {
        VariantKey::new(
            self.chromosome.clone(), self.position,
            self.ref_allele.clone(), self.alt_allele.clone()
        )
    }

    /// True if the record cleared the source caller's filters
    pub fn is_pass(&self) -> bool {
        self.filter_status == FilterStatus::Pass
    }

    // getters
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn ref_allele(&self) -> &str {
        &self.ref_allele
    }

    pub fn alt_allele(&self) -> &str {
        &self.alt_allele
    }

    pub fn variant_kind(&self) -> VariantKind {
        self.variant_kind
    }

    pub fn filter_status(&self) -> FilterStatus {
        self.filter_status
    }

    pub fn genotype(&self) -> Option<&str> {
        self.genotype.as_deref()
    }
}

/// Derives the variant kind from the allele lengths.
/// Symbolic alleles (`<DEL>`, `<NON_REF>`), the overlapping-deletion marker `*`, and
/// breakend notation never classify as SNP or indel regardless of length.
/// # Arguments
/// * `ref_allele` - reference allele sequence
/// * `alt_allele` - one alternate allele
pub fn classify_alleles(ref_allele: &str, alt_allele: &str) -> VariantKind {
    if alt_allele.starts_with('<') || alt_allele == "*" ||
        alt_allele.contains('[') || alt_allele.contains(']') {
        return VariantKind::Other;
    }

    match (ref_allele.len(), alt_allele.len()) {
        (1, 1) => VariantKind::Snp,
        (1, _) => VariantKind::Insertion,
        (_, 1) => VariantKind::Deletion,
        (_, _) => VariantKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_snp() {
        let record = VariantRecord::new(
            "chr20", 100,
            "A".to_string(), "T".to_string(),
            FilterStatus::Pass, Some("0/1".to_string())
        ).unwrap();
        assert_eq!(record.chromosome(), "20");
        assert_eq!(record.position(), 100);
        assert_eq!(record.variant_kind(), VariantKind::Snp);
        assert!(record.is_pass());
        assert_eq!(record.genotype(), Some("0/1"));
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(classify_alleles("A", "T"), VariantKind::Snp);
        assert_eq!(classify_alleles("A", "ATT"), VariantKind::Insertion);
        assert_eq!(classify_alleles("AGT", "A"), VariantKind::Deletion);
        assert_eq!(classify_alleles("AG", "TC"), VariantKind::Other);
        assert_eq!(classify_alleles("A", "<DEL>"), VariantKind::Other);
        assert_eq!(classify_alleles("A", "<NON_REF>"), VariantKind::Other);
        assert_eq!(classify_alleles("A", "*"), VariantKind::Other);
        assert_eq!(classify_alleles("A", "A[chr3:1234["), VariantKind::Other);
    }

    #[test]
    fn test_identity_key_crosses_naming_schemes() {
        let first = VariantRecord::new(
            "chr20", 100,
            "A".to_string(), "T".to_string(),
            FilterStatus::Pass, None
        ).unwrap();
        let second = VariantRecord::new(
            "20", 100,
            "A".to_string(), "T".to_string(),
            FilterStatus::Unknown, Some("1|1".to_string())
        ).unwrap();

        // filter and genotype are provenance, not identity
        assert_eq!(first.key(), second.key());
    }

    #[test]
    fn test_reference_span() {
        let snp = VariantRecord::new(
            "1", 100,
            "A".to_string(), "T".to_string(),
            FilterStatus::Pass, None
        ).unwrap();
        assert_eq!(snp.key().reference_span(), (99, 100));

        let deletion = VariantRecord::new(
            "1", 100,
            "AGTC".to_string(), "A".to_string(),
            FilterStatus::Pass, None
        ).unwrap();
        assert_eq!(deletion.key().reference_span(), (99, 103));
    }

    #[test]
    fn test_constructor_validation() {
        assert!(matches!(
            VariantRecord::new("", 100, "A".to_string(), "T".to_string(), FilterStatus::Pass, None),
            Err(VariantError::EmptyChromosome)
        ));
        assert!(matches!(
            VariantRecord::new("1", 0, "A".to_string(), "T".to_string(), FilterStatus::Pass, None),
            Err(VariantError::ZeroPosition)
        ));
        assert!(matches!(
            VariantRecord::new("1", 100, "".to_string(), "T".to_string(), FilterStatus::Pass, None),
            Err(VariantError::EmptyRefAllele)
        ));
        assert!(matches!(
            VariantRecord::new("1", 100, "A".to_string(), "".to_string(), FilterStatus::Pass, None),
            Err(VariantError::EmptyAltAllele)
        ));
    }

    #[test]
    fn test_key_display() {
        let record = VariantRecord::new(
            "chrX", 1500,
            "G".to_string(), "GAA".to_string(),
            FilterStatus::Pass, None
        ).unwrap();
        assert_eq!(record.key().to_string(), "X:1500:G>GAA");
    }
}
