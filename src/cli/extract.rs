use anyhow::ensure;
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_required_filename, DuplicatePolicy, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about)]
pub struct ExtractSettings {
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

    /// Set-algebra expression over pipeline labels, e.g. "(a & b) | ~c"
    #[clap(required = true)]
    #[clap(short = 'e')]
    #[clap(long = "expression")]
    #[clap(value_name = "EXPR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub expression: String,

    /// Output interval file (.bed or .bed.gz)
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-bed")]
    #[clap(value_name = "BED")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_bed: PathBuf,

    /// Includes non-PASS records in the evaluated sets
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

pub fn check_extract_settings(mut settings: ExtractSettings) -> anyhow::Result<ExtractSettings> {
    // hard code the version in
    settings.varisect_version = FULL_VERSION.clone();
    info!("Varisect version: {:?}", &settings.varisect_version);
    info!("Sub-command: extract");
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

    ensure!(!settings.expression.trim().is_empty(), "--expression must be non-empty");
    info!("\tExpression: {:?}", &settings.expression);

    // outputs
    info!("Outputs:");
    info!("\tOutput BED: {:?}", &settings.output_bed);

    // other misc parameters
    info!("Comparison parameters:");
    info!("\tRecord filter: {}", if settings.all_records { "ALL RECORDS" } else { "PASS ONLY" });
    info!("\tDuplicate policy: {}", settings.duplicate_policy);

    Ok(settings)
}
