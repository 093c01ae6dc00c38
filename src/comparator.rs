/*!
# Comparator
Holds the session state for comparing variant-call sets across pipelines.
Sets are registered up front as descriptors and nothing is read from disk until an operation
needs it; each set is loaded at most once per session and reused by every later operation.

## Example usage
```no_run
use std::path::PathBuf;
use varisect::comparator::{ComparisonSession, SessionConfig};
use varisect::data_types::variant_set::SetDescriptor;

// register two pipelines; no file is touched yet
let descriptors = vec![
    SetDescriptor::new(PathBuf::from("bwa_deepvariant.vcf.gz"), "deepvariant".to_string(), "bwa".to_string()),
    SetDescriptor::new(PathBuf::from("bwa_strelka.vcf.gz"), "strelka".to_string(), "bwa".to_string())
];
let mut session = ComparisonSession::new(descriptors, SessionConfig::default()).unwrap();

// the first overlap request loads both files; later requests reuse the cache
let overlap_result = session.compute_overlap().unwrap();
for pairwise in overlap_result.pairwise() {
    println!("{} vs {}: jaccard = {:.4}", pairwise.first_label(), pairwise.second_label(), pairwise.jaccard());
}
```
*/
use derive_builder::Builder;
use indexmap::IndexMap;
use log::info;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

use crate::data_types::overlap_metrics::OverlapResult;
use crate::data_types::truth_metrics::TruthSummary;
use crate::data_types::variant_set::{SetCounts, SetDescriptor, VariantSet};
use crate::data_types::variants::VariantKey;
use crate::overlap_solver::solve_overlaps;
use crate::parsing::confidence_regions::ConfidenceRegions;
use crate::parsing::vcf_loader::load_variant_set;
use crate::set_algebra::SetExpression;
use crate::truth_solver::score_against_truth;

/// Failure modes surfaced by a comparison session.
/// Every operation fails as a whole; no partial results are returned.
#[derive(thiserror::Error, Debug)]
pub enum ComparisonError {
    /// A source file or its sidecar index could not be reached or opened
    #[error("data source error for {path:?}: {reason}")]
    DataSource {
        path: PathBuf,
        reason: String
    },
    /// A source file was reachable but a record in it could not be decoded
    #[error("parse error in {path:?}: {reason}")]
    Parse {
        path: PathBuf,
        reason: String
    },
    /// The request itself is invalid, independent of any file content
    #[error("configuration error: {reason}")]
    Configuration {
        reason: String
    },
    /// Two eligible records in one set share an identity key under the rejecting policy
    #[error("duplicate variant identity in \"{label}\": {key}")]
    DuplicateIdentity {
        label: String,
        key: String
    }
}

/// Controls which records participate in every comparison of a session
#[derive(Builder, Clone, Copy)]
#[builder(default)]
pub struct SessionConfig {
    /// if true, only records with an explicit PASS filter enter the key sets
    passing_only: bool,
    /// if true, eligible records sharing an identity key abort the load instead of collapsing
    reject_duplicates: bool
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            passing_only: true,
            reject_duplicates: false
        }
    }
}

impl SessionConfig {
    // mostly getters
    pub fn passing_only(&self) -> bool {
        self.passing_only
    }

    pub fn reject_duplicates(&self) -> bool {
        self.reject_duplicates
    }
}

/// A single-user comparison session over a fixed collection of call sets.
/// All operations take `&mut self` because they may populate the load cache.
pub struct ComparisonSession {
    /// Policy applied to every load in this session
    config: SessionConfig,
    /// Registered descriptors in registration order, keyed by label
    descriptors: IndexMap<String, SetDescriptor>,
    /// Loaded sets, populated on first use and never evicted
    loaded_sets: IndexMap<String, VariantSet>,
    /// The most recently loaded truth set, keyed by the file it came from
    truth_cache: Option<(PathBuf, VariantSet)>
}

impl ComparisonSession {
    /// Creates a new session over the given descriptors.
    /// # Arguments
    /// * `descriptors` - one entry per call set; labels derived from them must be unique
    /// * `config` - filter and duplicate policy shared by every load
    /// # Errors
    /// * if no descriptors are provided
    /// * if any caller or mapper name is empty
    /// * if two descriptors produce the same label
    pub fn new(descriptors: Vec<SetDescriptor>, config: SessionConfig) -> Result<ComparisonSession, ComparisonError> {
        if descriptors.is_empty() {
            return Err(ComparisonError::Configuration {
                reason: "at least one input set is required".to_string()
            });
        }

        let mut descriptor_map: IndexMap<String, SetDescriptor> = Default::default();
        for descriptor in descriptors.into_iter() {
            if descriptor.caller().is_empty() || descriptor.mapper().is_empty() {
                return Err(ComparisonError::Configuration {
                    reason: format!("caller and mapper must be non-empty for {:?}", descriptor.path())
                });
            }
            let label = descriptor.label();
            if descriptor_map.insert(label.clone(), descriptor).is_some() {
                return Err(ComparisonError::Configuration {
                    reason: format!("duplicate set label: \"{label}\"")
                });
            }
        }

        Ok(ComparisonSession {
            config,
            descriptors: descriptor_map,
            loaded_sets: Default::default(),
            truth_cache: None
        })
    }

    /// Returns the set labels in registration order
    pub fn labels(&self) -> Vec<String> {
        self.descriptors.keys().cloned().collect()
    }

    /// Returns the loaded set for a label, reading the file on first use.
    /// # Arguments
    /// * `label` - one of the registered set labels
    /// # Errors
    /// * `Configuration` if the label is not registered
    /// * any load error from the underlying file
    pub fn variant_set(&mut self, label: &str) -> Result<&VariantSet, ComparisonError> {
        if !self.loaded_sets.contains_key(label) {
            let descriptor = self.descriptors.get(label)
                .ok_or_else(|| ComparisonError::Configuration {
                    reason: format!("unknown set label: \"{label}\"")
                })?;
            info!("Loading \"{label}\" from {:?}...", descriptor.path());
            let variant_set = load_variant_set(label, descriptor.path(), &self.config)?;
            info!("\tFound {} eligible variant(s)", variant_set.key_set().len());
            self.loaded_sets.insert(label.to_string(), variant_set);
        }
        Ok(&self.loaded_sets[label])
    }

    /// Loads every registered set that is not already cached
    pub fn preload_all(&mut self) -> Result<(), ComparisonError> {
        let labels = self.labels();
        for label in labels.iter() {
            self.variant_set(label)?;
        }
        Ok(())
    }

    /// Tallies each registered set by variant kind, in registration order
    pub fn compute_statistics(&mut self) -> Result<Vec<(SetDescriptor, SetCounts)>, ComparisonError> {
        let labels = self.labels();
        let mut rows = Vec::with_capacity(labels.len());
        for label in labels.iter() {
            let descriptor = self.descriptors[label].clone();
            let counts = self.variant_set(label)?.counts();
            rows.push((descriptor, counts));
        }
        Ok(rows)
    }

    /// Computes pairwise overlaps for every set pair plus the exclusive region partition.
    /// Partition rows are produced for two-set (3 regions) and three-set (7 regions) sessions;
    /// larger sessions get the pairwise table only.
    /// # Errors
    /// * `Configuration` if fewer than two sets are registered
    /// * any load error from the underlying files
    pub fn compute_overlap(&mut self) -> Result<OverlapResult, ComparisonError> {
        if self.descriptors.len() < 2 {
            return Err(ComparisonError::Configuration {
                reason: "set comparison requires at least two input sets".to_string()
            });
        }

        self.preload_all()?;
        let labels = self.labels();
        let keyed_sets: Vec<(&str, &FxHashSet<VariantKey>)> = labels.iter()
            .map(|label| (label.as_str(), self.loaded_sets[label.as_str()].key_set()))
            .collect();
        Ok(solve_overlaps(&keyed_sets))
    }

    /// Scores every registered set against a truth set, optionally restricted to confidence regions.
    /// Results are keyed by set label in registration order.
    /// # Arguments
    /// * `truth_path` - the truth variant-call file; cached for repeat calls with the same path
    /// * `confidence_path` - optional BED file restricting both sides of the comparison
    /// # Errors
    /// * any load error from the pipeline files, the truth file, or the BED file
    pub fn compute_metrics_vs_truth(
        &mut self, truth_path: &Path, confidence_path: Option<&Path>
    ) -> Result<IndexMap<String, TruthSummary>, ComparisonError> {
        self.preload_all()?;
        self.load_truth(truth_path)?;

        let confidence_regions = match confidence_path {
            Some(bed_fn) => {
                if !bed_fn.is_file() {
                    return Err(ComparisonError::DataSource {
                        path: bed_fn.to_path_buf(),
                        reason: "file does not exist".to_string()
                    });
                }
                let regions = ConfidenceRegions::from_bed(bed_fn)
                    .map_err(|e| ComparisonError::Parse {
                        path: bed_fn.to_path_buf(),
                        reason: format!("{e:#}")
                    })?;
                info!("Loaded {} confidence region(s) from {bed_fn:?}", regions.interval_count());
                Some(regions)
            },
            None => None
        };

        let truth_set = self.cached_truth()?;
        let mut summaries: IndexMap<String, TruthSummary> = Default::default();
        for (label, pipeline_set) in self.loaded_sets.iter() {
            let summary = score_against_truth(pipeline_set, truth_set, confidence_regions.as_ref());
            summaries.insert(label.clone(), summary);
        }
        Ok(summaries)
    }

    /// Evaluates a set-algebra expression over the session's key sets.
    /// Complement is taken relative to the union of every registered set, so an expression
    /// containing `~` forces a full preload; otherwise only the referenced sets are loaded.
    /// # Arguments
    /// * `expression_text` - for example `"(a & b) | ~c"`
    /// # Errors
    /// * `Configuration` if the expression fails to parse or references an unknown label
    /// * any load error from the underlying files
    pub fn evaluate_expression(&mut self, expression_text: &str) -> Result<FxHashSet<VariantKey>, ComparisonError> {
        let expression = SetExpression::parse(expression_text)?;
        for label in expression.referenced_labels() {
            if !self.descriptors.contains_key(&label) {
                return Err(ComparisonError::Configuration {
                    reason: format!("unknown set label in expression: \"{label}\"")
                });
            }
        }

        let required: Vec<String> = if expression.uses_complement() {
            self.labels()
        } else {
            expression.referenced_labels().into_iter().collect()
        };
        for label in required.iter() {
            self.variant_set(label)?;
        }

        let context: IndexMap<&str, &FxHashSet<VariantKey>> = required.iter()
            .map(|label| (label.as_str(), self.loaded_sets[label.as_str()].key_set()))
            .collect();
        expression.evaluate(&context)
    }

    /// Loads the truth set unless the cache already holds this exact path
    fn load_truth(&mut self, truth_path: &Path) -> Result<(), ComparisonError> {
        let cache_hit = matches!(
            self.truth_cache.as_ref(),
            Some((cached_path, _)) if cached_path == truth_path
        );
        if !cache_hit {
            info!("Loading truth set from {truth_path:?}...");
            let truth_set = load_variant_set("truth", truth_path, &self.config)?;
            info!("\tFound {} eligible variant(s)", truth_set.key_set().len());
            self.truth_cache = Some((truth_path.to_path_buf(), truth_set));
        }
        Ok(())
    }

    fn cached_truth(&self) -> Result<&VariantSet, ComparisonError> {
        match self.truth_cache.as_ref() {
            Some((_, truth_set)) => Ok(truth_set),
            None => Err(ComparisonError::Configuration {
                reason: "truth metrics requested before any truth file was loaded".to_string()
            })
        }
    }

    // getters
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn descriptors(&self) -> &IndexMap<String, SetDescriptor> {
        &self.descriptors
    }
}
