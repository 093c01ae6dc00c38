
use log::debug;
use noodles::vcf::{self, variant::RecordBuf};
use noodles::vcf::variant::record::samples::keys::key as vcf_key;
use rustc_hash::FxHashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::comparator::{ComparisonError, SessionConfig};
use crate::data_types::variant_set::VariantSet;
use crate::data_types::variants::{FilterStatus, VariantKey, VariantRecord};

/// Returns true if a tabix or CSI sidecar index sits next to the given file
pub fn sidecar_index_exists(path: &Path) -> bool {
    ["tbi", "csi"].iter().any(|extension| {
        let mut index_name = path.as_os_str().to_owned();
        index_name.push(format!(".{extension}"));
        PathBuf::from(index_name).is_file()
    })
}

/// Wrapper function that handles both bgzip compressed and uncompressed VCF files
/// # Arguments
/// * `path` - path to the .vcf(.gz) file to open
fn open_vcf_file(path: &Path) -> Result<vcf::io::Reader<Box<dyn BufRead>>, ComparisonError> {
    let is_compressed = match path.extension() {
        Some(extension) => {
            extension == "gz"
        },
        None => false
    };

    let buf_reader: Box<dyn BufRead> = if is_compressed {
        #[allow(clippy::default_constructed_unit_structs)]
        let bgzf_reader = noodles::bgzf::io::reader::Builder::default()
            .build_from_path(path)
            .map_err(|e| ComparisonError::DataSource {
                path: path.to_path_buf(),
                reason: format!("failed to open: {e}")
            })?;
        Box::new(BufReader::new(bgzf_reader))
    } else {
        let file = File::open(path)
            .map_err(|e| ComparisonError::DataSource {
                path: path.to_path_buf(),
                reason: format!("failed to open: {e}")
            })?;
        Box::new(BufReader::new(file))
    };

    Ok(vcf::io::Reader::new(buf_reader))
}

/// Loads a full variant-call file into a `VariantSet`.
/// Multi-allelic rows are split into one record per alternate allele; rows with no alternate
/// allele at all (gVCF reference blocks) are skipped. Records that fail the session's filter
/// policy stay in the table but never enter the key set.
/// # Arguments
/// * `label` - the stable set label this file loads under
/// * `path` - path to the bgzip-compressed, indexed variant-call file
/// * `config` - session policy for filtering and duplicate handling
/// # Errors
/// * `DataSource` if the file or its sidecar index is missing or unreadable
/// * `Parse` if any record cannot be decoded; the whole load fails rather than dropping records
/// * `DuplicateIdentity` if two eligible records share a key and the policy is reject
pub fn load_variant_set(label: &str, path: &Path, config: &SessionConfig) -> Result<VariantSet, ComparisonError> {
    if !path.is_file() {
        return Err(ComparisonError::DataSource {
            path: path.to_path_buf(),
            reason: "file does not exist".to_string()
        });
    }
    if !sidecar_index_exists(path) {
        return Err(ComparisonError::DataSource {
            path: path.to_path_buf(),
            reason: "no sidecar index (.tbi or .csi) found".to_string()
        });
    }

    let mut vcf_reader = open_vcf_file(path)?;
    let vcf_header = vcf_reader.read_header()
        .map_err(|e| ComparisonError::Parse {
            path: path.to_path_buf(),
            reason: format!("failed to read header: {e}")
        })?;

    let mut records: Vec<VariantRecord> = vec![];
    let mut key_set: FxHashSet<VariantKey> = Default::default();
    let mut collapsed_count = 0;
    let mut skipped_non_variant = 0;

    for result in vcf_reader.records() {
        let record = result.map_err(|e| ComparisonError::Parse {
            path: path.to_path_buf(),
            reason: format!("failed to read record: {e}")
        })?;
        let record_buf = RecordBuf::try_from_variant_record(&vcf_header, &record)
            .map_err(|e| ComparisonError::Parse {
                path: path.to_path_buf(),
                reason: format!("failed to decode record: {e}")
            })?;

        let chromosome = record_buf.reference_sequence_name().to_string();
        let position = record_buf.variant_start()
            .ok_or_else(|| ComparisonError::Parse {
                path: path.to_path_buf(),
                reason: format!("missing position on {chromosome}")
            })?
            .get() as u64;
        let ref_allele = record_buf.reference_bases().to_string();
        let alt_alleles: &[String] = record_buf.alternate_bases().as_ref();

        // gVCF reference blocks and other non-variant rows carry no alternate allele
        if alt_alleles.is_empty() {
            skipped_non_variant += 1;
            continue;
        }

        let filter_status = reduce_filters(&record_buf);
        let genotype = first_sample_genotype(&record_buf);

        for alt_allele in alt_alleles.iter() {
            let variant = VariantRecord::new(
                &chromosome, position,
                ref_allele.clone(), alt_allele.clone(),
                filter_status, genotype.clone()
            ).map_err(|e| ComparisonError::Parse {
                path: path.to_path_buf(),
                reason: format!("{chromosome}:{position}: {e}")
            })?;

            let eligible = !config.passing_only() || variant.is_pass();
            if eligible {
                let key = variant.key();
                if key_set.contains(&key) {
                    if config.reject_duplicates() {
                        return Err(ComparisonError::DuplicateIdentity {
                            label: label.to_string(),
                            key: key.to_string()
                        });
                    }
                    // collapse policy, the first record for this key wins
                    collapsed_count += 1;
                    continue;
                }
                key_set.insert(key);
            }
            records.push(variant);
        }
    }

    if collapsed_count > 0 {
        debug!("Collapsed {collapsed_count} duplicate record(s) while loading \"{label}\"");
    }
    if skipped_non_variant > 0 {
        debug!("Skipped {skipped_non_variant} non-variant row(s) while loading \"{label}\"");
    }
    debug!("Loaded {} record(s) with {} eligible key(s) from {path:?}", records.len(), key_set.len());

    Ok(VariantSet::new(label.to_string(), path.to_path_buf(), records, key_set))
}

/// Reduces a record's FILTER values to the three states we track
fn reduce_filters(record: &RecordBuf) -> FilterStatus {
    let filters: &indexmap::IndexSet<String> = record.filters().as_ref();
    if filters.is_empty() {
        FilterStatus::Unknown
    } else if filters.len() == 1 && filters.contains("PASS") {
        FilterStatus::Pass
    } else {
        FilterStatus::Filtered
    }
}

/// Renders the first sample's GT with the original separators, if the record carries one
fn first_sample_genotype(record: &RecordBuf) -> Option<String> {
    use vcf::variant::record::samples::series::value::genotype::Phasing;

    let sample = record.samples().get_index(0)?;
    let gt_value = sample.get(vcf_key::GENOTYPE)??;

    if let vcf::variant::record_buf::samples::sample::Value::Genotype(genotype) = gt_value {
        let mut rendered = String::new();
        for (index, allele) in genotype.as_ref().iter().enumerate() {
            if index > 0 {
                rendered.push(if allele.phasing() == Phasing::Phased { '|' } else { '/' });
            }
            match allele.position() {
                Some(position) => rendered.push_str(&position.to_string()),
                None => rendered.push('.')
            };
        }
        Some(rendered)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::data_types::variants::VariantKind;

    const VCF_HEADER: &str = "##fileformat=VCFv4.2\n\
        ##FILTER=<ID=PASS,Description=\"All filters passed\">\n\
        ##FILTER=<ID=q10,Description=\"Quality below 10\">\n\
        ##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
        ##contig=<ID=chr20>\n\
        #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tsample1\n";

    /// Writes a bgzip-compressed VCF with an empty sidecar index next to it
    fn write_vcf(dir: &Path, name: &str, body: &str) -> PathBuf {
        let vcf_fn = dir.join(name);
        let file = File::create(&vcf_fn).unwrap();
        let mut writer = noodles::bgzf::io::Writer::new(file);
        writer.write_all(VCF_HEADER.as_bytes()).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
        writer.finish().unwrap();

        let mut index_name = vcf_fn.as_os_str().to_owned();
        index_name.push(".tbi");
        File::create(PathBuf::from(index_name)).unwrap();
        vcf_fn
    }

    #[test]
    fn test_basic_load() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let vcf_fn = write_vcf(temp_dir.path(), "calls.vcf.gz", "\
            chr20\t100\t.\tA\tT\t30\tPASS\t.\tGT\t0/1\n\
            chr20\t200\t.\tC\tG\t40\tPASS\t.\tGT\t1|1\n\
            chr20\t300\t.\tT\tTA\t50\tq10\t.\tGT\t0/1\n\
            chr20\t400\t.\tGAC\tG\t20\t.\t.\tGT\t1/1\n");

        let variant_set = load_variant_set("bwa_deepvariant", &vcf_fn, &SessionConfig::default()).unwrap();
        assert_eq!(variant_set.label(), "bwa_deepvariant");
        assert_eq!(variant_set.records().len(), 4);

        // pass-only policy: only the two PASS rows enter the key set
        assert_eq!(variant_set.key_set().len(), 2);
        let snp = VariantKey::new("20".to_string(), 100, "A".to_string(), "T".to_string());
        assert!(variant_set.key_set().contains(&snp));

        // chromosome is normalized and the table preserves file order
        assert_eq!(variant_set.records()[0].chromosome(), "20");
        assert_eq!(variant_set.records()[0].genotype(), Some("0/1"));
        assert_eq!(variant_set.records()[1].genotype(), Some("1|1"));
        assert_eq!(variant_set.records()[2].filter_status(), FilterStatus::Filtered);
        assert_eq!(variant_set.records()[3].filter_status(), FilterStatus::Unknown);
        assert_eq!(variant_set.records()[3].variant_kind(), VariantKind::Deletion);
    }

    #[test]
    fn test_multi_allelic_split() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let vcf_fn = write_vcf(temp_dir.path(), "calls.vcf.gz", "\
            chr20\t100\t.\tA\tG,T\t30\tPASS\t.\tGT\t1/2\n");

        let variant_set = load_variant_set("bwa_deepvariant", &vcf_fn, &SessionConfig::default()).unwrap();
        assert_eq!(variant_set.records().len(), 2);
        assert_eq!(variant_set.key_set().len(), 2);
        assert_eq!(variant_set.records()[0].alt_allele(), "G");
        assert_eq!(variant_set.records()[1].alt_allele(), "T");

        // both splits carry the same genotype rendering
        assert_eq!(variant_set.records()[0].genotype(), Some("1/2"));
        assert_eq!(variant_set.records()[1].genotype(), Some("1/2"));
    }

    #[test]
    fn test_non_variant_rows_skipped() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let vcf_fn = write_vcf(temp_dir.path(), "calls.g.vcf.gz", "\
            chr20\t100\t.\tA\tT\t30\tPASS\t.\tGT\t0/1\n\
            chr20\t101\t.\tG\t.\t.\tPASS\t.\tGT\t0/0\n");

        let variant_set = load_variant_set("bwa_deepvariant", &vcf_fn, &SessionConfig::default()).unwrap();
        assert_eq!(variant_set.records().len(), 1);
        assert_eq!(variant_set.records()[0].position(), 100);
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let vcf_fn = temp_dir.path().join("absent.vcf.gz");
        let result = load_variant_set("bwa_deepvariant", &vcf_fn, &SessionConfig::default());
        assert!(matches!(result, Err(ComparisonError::DataSource { .. })));
    }

    #[test]
    fn test_missing_index() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let vcf_fn = temp_dir.path().join("calls.vcf.gz");
        let file = File::create(&vcf_fn).unwrap();
        let mut writer = noodles::bgzf::io::Writer::new(file);
        writer.write_all(VCF_HEADER.as_bytes()).unwrap();
        writer.finish().unwrap();

        let result = load_variant_set("bwa_deepvariant", &vcf_fn, &SessionConfig::default());
        match result {
            Err(ComparisonError::DataSource { reason, .. }) => {
                assert!(reason.contains("index"));
            },
            other => panic!("Expected a data source failure, got {other:?}")
        };
    }

    #[test]
    fn test_malformed_record() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let vcf_fn = write_vcf(temp_dir.path(), "calls.vcf.gz", "\
            chr20\tnot_a_number\t.\tA\tT\t30\tPASS\t.\tGT\t0/1\n");

        let result = load_variant_set("bwa_deepvariant", &vcf_fn, &SessionConfig::default());
        assert!(matches!(result, Err(ComparisonError::Parse { .. })));
    }

    #[test]
    fn test_duplicate_collapse() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let vcf_fn = write_vcf(temp_dir.path(), "calls.vcf.gz", "\
            chr20\t100\t.\tA\tT\t30\tPASS\t.\tGT\t0/1\n\
            20\t100\t.\tA\tT\t99\tPASS\t.\tGT\t1/1\n");

        let variant_set = load_variant_set("bwa_deepvariant", &vcf_fn, &SessionConfig::default()).unwrap();

        // first record wins, the duplicate never reaches the table
        assert_eq!(variant_set.records().len(), 1);
        assert_eq!(variant_set.key_set().len(), 1);
        assert_eq!(variant_set.records()[0].genotype(), Some("0/1"));
    }

    #[test]
    fn test_duplicate_reject() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let vcf_fn = write_vcf(temp_dir.path(), "calls.vcf.gz", "\
            chr20\t100\t.\tA\tT\t30\tPASS\t.\tGT\t0/1\n\
            chr20\t100\t.\tA\tT\t99\tPASS\t.\tGT\t1/1\n");

        let config = crate::comparator::SessionConfigBuilder::default()
            .reject_duplicates(true)
            .build().unwrap();
        let result = load_variant_set("bwa_deepvariant", &vcf_fn, &config);
        match result {
            Err(ComparisonError::DuplicateIdentity { label, key }) => {
                assert_eq!(label, "bwa_deepvariant");
                assert_eq!(key, "20:100:A>T");
            },
            other => panic!("Expected a duplicate identity failure, got {other:?}")
        };
    }

    #[test]
    fn test_all_records_mode() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let vcf_fn = write_vcf(temp_dir.path(), "calls.vcf.gz", "\
            chr20\t100\t.\tA\tT\t30\tPASS\t.\tGT\t0/1\n\
            chr20\t300\t.\tT\tTA\t50\tq10\t.\tGT\t0/1\n");

        let config = crate::comparator::SessionConfigBuilder::default()
            .passing_only(false)
            .build().unwrap();
        let variant_set = load_variant_set("bwa_deepvariant", &vcf_fn, &config).unwrap();
        assert_eq!(variant_set.key_set().len(), 2);
    }

    #[test]
    fn test_symbolic_alt_kept() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let vcf_fn = write_vcf(temp_dir.path(), "calls.vcf.gz", "\
            chr20\t500\t.\tT\t<DEL>\t30\tPASS\t.\tGT\t0/1\n");

        let variant_set = load_variant_set("bwa_deepvariant", &vcf_fn, &SessionConfig::default()).unwrap();
        assert_eq!(variant_set.records().len(), 1);
        assert_eq!(variant_set.records()[0].alt_allele(), "<DEL>");
        assert_eq!(variant_set.records()[0].variant_kind(), VariantKind::Other);
    }
}
