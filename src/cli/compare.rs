use anyhow::ensure;
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_optional_filename, check_required_filename, DuplicatePolicy, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about)]
pub struct CompareSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    varisect_version: String,

    /// Pipeline variant call file (VCF), one per pipeline
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input-vcf")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub vcf_filenames: Vec<PathBuf>,

    /// The variant caller that produced the corresponding VCF
    #[clap(required = true)]
    #[clap(short = 'c')]
    #[clap(long = "caller")]
    #[clap(value_name = "NAME")]
    #[clap(help_heading = Some("Input/Output"))]
    pub callers: Vec<String>,

    /// The read mapper that fed the corresponding VCF
    #[clap(required = true)]
    #[clap(short = 'm')]
    #[clap(long = "mapper")]
    #[clap(value_name = "NAME")]
    #[clap(help_heading = Some("Input/Output"))]
    pub mappers: Vec<String>,

    /// Truth variant call file (VCF); enables exact-identity precision/recall scoring
    #[clap(short = 't')]
    #[clap(long = "truth-vcf")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub truth_vcf_filename: Option<PathBuf>,

    /// Confidence regions restricting truth scoring (BED)
    #[clap(short = 'b')]
    #[clap(long = "confidence-regions")]
    #[clap(value_name = "BED")]
    #[clap(help_heading = Some("Input/Output"))]
    pub confidence_regions: Option<PathBuf>,

    /// Output directory containing the summary tables
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

    /// Optional output debug folder
    #[clap(long = "output-debug")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub debug_folder: Option<PathBuf>,

    /// Includes non-PASS records in all comparisons
    #[clap(long = "all-records")]
    #[clap(help_heading = Some("Comparison parameters"))]
    pub all_records: bool,

    /// Policy for records that repeat an identity key within one VCF
    #[clap(long = "duplicates")]
    #[clap(value_name = "POLICY")]
    #[clap(help_heading = Some("Comparison parameters"))]
    #[clap(default_value = "collapse")]
    pub duplicate_policy: DuplicatePolicy,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_compare_settings(mut settings: CompareSettings) -> anyhow::Result<CompareSettings> {
    // hard code the version in
    settings.varisect_version = FULL_VERSION.clone();
    info!("Varisect version: {:?}", &settings.varisect_version);
    info!("Sub-command: compare");
    info!("Inputs:");

    // the caller/mapper lists run parallel to the VCF list
    ensure!(
        settings.callers.len() == settings.vcf_filenames.len(),
        "--caller must be provided once per --input-vcf ({} != {})",
        settings.callers.len(), settings.vcf_filenames.len()
    );
    ensure!(
        settings.mappers.len() == settings.vcf_filenames.len(),
        "--mapper must be provided once per --input-vcf ({} != {})",
        settings.mappers.len(), settings.vcf_filenames.len()
    );

    // check the input VCFs and corresponding metadata
    for (i, i_vcf) in settings.vcf_filenames.iter().enumerate() {
        check_required_filename(i_vcf, format!("Input VCF #{i}").as_str())?;
        ensure!(!settings.callers[i].is_empty(), "--caller for input VCF #{i} must be non-empty");
        ensure!(!settings.mappers[i].is_empty(), "--mapper for input VCF #{i} must be non-empty");
        info!("\tInput VCF #{i}: {i_vcf:?}");
        info!("\t\tPipeline label: {:?}", format!("{}_{}", settings.mappers[i], settings.callers[i]));
    }
    check_optional_filename(settings.truth_vcf_filename.as_deref(), "Truth VCF")?;
    check_optional_filename(settings.confidence_regions.as_deref(), "Confidence regions")?;

    // dump stuff to the logger
    if let Some(truth_fn) = settings.truth_vcf_filename.as_deref() {
        info!("\tTruth VCF: {truth_fn:?}");
    } else {
        info!("\tTruth VCF: None");
    }
    if let Some(bed_fn) = settings.confidence_regions.as_deref() {
        info!("\tConfidence regions: {bed_fn:?}");
    } else {
        info!("\tConfidence regions: None");
    }

    // outputs
    info!("Outputs:");
    info!("\tOutput folder: {:?}", &settings.output_folder);
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        info!("\tDebug folder: {debug_folder:?}");
    }

    // other misc parameters
    info!("Comparison parameters:");
    info!("\tRecord filter: {}", if settings.all_records { "ALL RECORDS" } else { "PASS ONLY" });
    info!("\tDuplicate policy: {}", settings.duplicate_policy);

    Ok(settings)
}
