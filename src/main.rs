use chrono::Utc;
use indicatif::ProgressIterator;
use log::{LevelFilter, error, info};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use varisect::cli::compare::{CompareSettings, check_compare_settings};
use varisect::cli::core::{Commands, DuplicatePolicy, get_cli};
use varisect::cli::extract::{ExtractSettings, check_extract_settings};
use varisect::comparator::{ComparisonError, ComparisonSession, SessionConfig, SessionConfigBuilder};
use varisect::data_types::variant_set::SetDescriptor;
use varisect::util::json_io::save_json;
use varisect::util::progress_bar::get_progress_style;
use varisect::writers::count_summary::write_count_summary;
use varisect::writers::interval_export::write_variant_bed;
use varisect::writers::metrics_summary::write_truth_metrics;
use varisect::writers::overlap_summary::write_overlap_summary;
use varisect::writers::plot_data::{write_jaccard_matrix, write_precision_recall};

/// The resolved settings of one run plus its timestamp, for the debug folder
#[derive(Serialize)]
struct RunManifest<'a, T: Serialize> {
    /// RFC 3339 timestamp of the run
    created: String,
    /// The resolved CLI settings
    settings: &'a T
}

/// Shared logging setup driven by the repeated -v flag
fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

/// Maps an engine failure to the conventional process exit code
fn engine_exit_code(error: &ComparisonError) -> exitcode::ExitCode {
    match error {
        ComparisonError::Configuration { .. } => exitcode::CONFIG,
        ComparisonError::DataSource { .. } |
            ComparisonError::Parse { .. } => exitcode::IOERR,
        ComparisonError::DuplicateIdentity { .. } => exitcode::DATAERR
    }
}

/// Builds a session from the parallel CLI input lists
/// # Arguments
/// * `vcf_filenames` - one VCF per pipeline
/// * `callers` / `mappers` - parallel label components
/// * `all_records` - disables the default pass-only filtering
/// * `duplicate_policy` - collapse or reject repeated identity keys
fn build_session(
    vcf_filenames: &[PathBuf], callers: &[String], mappers: &[String],
    all_records: bool, duplicate_policy: DuplicatePolicy
) -> ComparisonSession {
    let descriptors: Vec<SetDescriptor> = vcf_filenames.iter()
        .zip(callers.iter().zip(mappers.iter()))
        .map(|(path, (caller, mapper))| SetDescriptor::new(path.clone(), caller.clone(), mapper.clone()))
        .collect();

    let config: SessionConfig = match SessionConfigBuilder::default()
        .passing_only(!all_records)
        .reject_duplicates(matches!(duplicate_policy, DuplicatePolicy::Reject))
        .build() {
        Ok(c) => c,
        Err(e) => {
            error!("Error while building session config: {e}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    match ComparisonSession::new(descriptors, config) {
        Ok(session) => session,
        Err(e) => {
            error!("Error while creating comparison session: {e}");
            std::process::exit(exitcode::CONFIG);
        }
    }
}

fn run_compare(settings: CompareSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    init_logging(settings.verbosity);

    let settings = match check_compare_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    // create the primary output folder
    info!("Creating output folder at {:?}...", settings.output_folder);
    match std::fs::create_dir_all(&settings.output_folder) {
        Ok(()) => {},
        Err(e) => {
            error!("Error while creating output folder: {e}");
            std::process::exit(exitcode::IOERR);
        }
    }

    // create a debug folder if specified and record how this run was configured
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        info!("Creating debug folder at {debug_folder:?}...");
        match std::fs::create_dir_all(debug_folder) {
            Ok(()) => {},
            Err(e) => {
                error!("Error while creating debug folder: {e}");
                std::process::exit(exitcode::IOERR);
            }
        }

        // save the CLI options
        let manifest = RunManifest {
            created: Utc::now().to_rfc3339(),
            settings: &settings
        };
        let cli_json = debug_folder.join("settings.json");
        info!("Saving CLI options to {cli_json:?}...");
        if let Err(e) = save_json(&manifest, &cli_json) {
            error!("Error while saving CLI options: {e}");
            std::process::exit(exitcode::IOERR);
        }
    }

    let mut session = build_session(
        &settings.vcf_filenames, &settings.callers, &settings.mappers,
        settings.all_records, settings.duplicate_policy
    );

    // load every set up front so the progress bar covers all the file I/O
    info!("Loading variant sets...");
    let style = get_progress_style();
    for label in session.labels().into_iter().progress_with_style(style) {
        if let Err(e) = session.variant_set(&label) {
            error!("Error while loading variant set \"{label}\": {e}");
            std::process::exit(engine_exit_code(&e));
        }
    }

    // per-pipeline counts
    let count_rows = match session.compute_statistics() {
        Ok(rows) => rows,
        Err(e) => {
            error!("Error while computing per-set statistics: {e}");
            std::process::exit(engine_exit_code(&e));
        }
    };
    let counts_fn = settings.output_folder.join("variant_counts.tsv");
    info!("Saving variant counts to {counts_fn:?}...");
    if let Err(e) = write_count_summary(&count_rows, &counts_fn) {
        error!("Error while saving variant counts: {e}");
        std::process::exit(exitcode::IOERR);
    }

    // overlap needs at least two sets; a single pipeline still gets counts and truth metrics
    if session.labels().len() >= 2 {
        let overlap_result = match session.compute_overlap() {
            Ok(r) => r,
            Err(e) => {
                error!("Error while computing overlaps: {e}");
                std::process::exit(engine_exit_code(&e));
            }
        };

        let overlap_fn = settings.output_folder.join("overlap_summary.json");
        info!("Saving overlap summary to {overlap_fn:?}...");
        if let Err(e) = write_overlap_summary(&overlap_result, &overlap_fn) {
            error!("Error while saving overlap summary: {e:#}");
            std::process::exit(exitcode::IOERR);
        }

        // the heatmap table wants the set sizes for the diagonal
        let mut set_sizes: Vec<(String, usize)> = vec![];
        for label in session.labels().into_iter() {
            let key_count = match session.variant_set(&label) {
                Ok(variant_set) => variant_set.key_set().len(),
                Err(e) => {
                    error!("Error while loading variant set \"{label}\": {e}");
                    std::process::exit(engine_exit_code(&e));
                }
            };
            set_sizes.push((label, key_count));
        }
        let jaccard_fn = settings.output_folder.join("jaccard_matrix.tsv");
        info!("Saving Jaccard matrix to {jaccard_fn:?}...");
        if let Err(e) = write_jaccard_matrix(&set_sizes, overlap_result.pairwise(), &jaccard_fn) {
            error!("Error while saving Jaccard matrix: {e}");
            std::process::exit(exitcode::IOERR);
        }
    } else {
        info!("Fewer than two pipelines configured, skipping overlap outputs.");
    }

    // truth scoring only happens when a truth VCF was provided
    if let Some(truth_fn) = settings.truth_vcf_filename.as_deref() {
        let summaries = match session.compute_metrics_vs_truth(truth_fn, settings.confidence_regions.as_deref()) {
            Ok(s) => s,
            Err(e) => {
                error!("Error while computing truth metrics: {e}");
                std::process::exit(engine_exit_code(&e));
            }
        };

        let metrics_fn = settings.output_folder.join("metrics_vs_truth.json");
        info!("Saving truth metrics to {metrics_fn:?}...");
        if let Err(e) = write_truth_metrics(&summaries, &metrics_fn) {
            error!("Error while saving truth metrics: {e:#}");
            std::process::exit(exitcode::IOERR);
        }

        let pr_fn = settings.output_folder.join("precision_recall.tsv");
        info!("Saving precision-recall table to {pr_fn:?}...");
        if let Err(e) = write_precision_recall(&summaries, &pr_fn) {
            error!("Error while saving precision-recall table: {e}");
            std::process::exit(exitcode::IOERR);
        }
    }

    info!("Compare completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_extract(settings: ExtractSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    init_logging(settings.verbosity);

    let settings = match check_extract_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let mut session = build_session(
        &settings.vcf_filenames, &settings.callers, &settings.mappers,
        settings.all_records, settings.duplicate_policy
    );

    // the expression is parsed and label-checked before any file is written
    info!("Evaluating expression {:?}...", &settings.expression);
    let resolved_keys = match session.evaluate_expression(&settings.expression) {
        Ok(keys) => keys,
        Err(e) => {
            error!("Error while evaluating expression: {e}");
            std::process::exit(engine_exit_code(&e));
        }
    };
    info!("Expression resolved to {} variant(s).", resolved_keys.len());

    info!("Saving intervals to {:?}...", settings.output_bed);
    if let Err(e) = write_variant_bed(&resolved_keys, &settings.output_bed) {
        error!("Error while saving intervals: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Extract completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Compare(settings) => {
            run_compare(*settings);
        },
        Commands::Extract(settings) => {
            run_extract(*settings);
        }
    }

    info!("Process finished successfully.");
}
