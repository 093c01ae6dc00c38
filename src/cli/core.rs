use anyhow::bail;
use clap::{Parser, Subcommand};
use lazy_static::lazy_static;
use serde::Serialize;
use std::path::Path;
use strum_macros::EnumString;

use crate::cli::compare::CompareSettings;
use crate::cli::extract::ExtractSettings;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.4.2-6bb9635-dirty` - while on a dirty branch
    /// * `0.4.2-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));
}

#[derive(Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

/// Varisect, a tool for dissecting the concordance of variant calling pipelines.
/// Select a subcommand to see more usage information:
#[derive(Subcommand)]
pub enum Commands {
    /// Computes counts, overlaps, and optional truth metrics across pipeline VCFs
    Compare(Box<CompareSettings>),
    /// Evaluates a set-algebra expression over pipeline VCFs and exports it as a BED file
    Extract(Box<ExtractSettings>)
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Policy for repeated identity keys within one loaded set
#[derive(Clone, Copy, Default, Debug, strum_macros::Display, EnumString, Serialize, clap::ValueEnum)]
pub enum DuplicatePolicy {
    /// The first record for an identity key wins; later duplicates are dropped and counted
    #[default]
    #[strum(ascii_case_insensitive, serialize = "collapse")]
    #[clap(name = "collapse")]
    Collapse,
    /// A repeated identity key fails the whole load
    #[strum(ascii_case_insensitive, serialize = "reject")]
    #[clap(name = "reject")]
    Reject,
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if !filename.exists() {
        bail!("{} does not exist: \"{}\"", label, filename.display());
    }

    // file exists
    Ok(())
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_optional_filename(opt_filename: Option<&Path>, label: &str) -> anyhow::Result<()> {
    if let Some(filename) = opt_filename {
        if !filename.exists() {
            bail!("{} does not exist: \"{}\"", label, filename.display());
        }
    }

    // file either was not specified OR it exists
    Ok(())
}
