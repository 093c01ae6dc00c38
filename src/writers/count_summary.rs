

use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::data_types::variant_set::{SetCounts, SetDescriptor};

/// Contains all the data written to each row of our counts file
#[derive(Serialize)]
struct CountRow {
    /// Stable set label
    pipeline: String,
    /// Variant caller that produced the set
    caller: String,
    /// Read mapper that fed the caller
    mapper: String,
    /// Total number of eligible variants
    total_variants: usize,
    /// Single-nucleotide substitutions
    snps: usize,
    /// Insertions plus deletions
    indels: usize
}

/// Will write one tally row per set to the given file path
/// # Arguments
/// * `rows` - per-set descriptors and tallies, in presentation order
/// * `filename` - the filename for the output (tsv/csv)
pub fn write_count_summary(rows: &[(SetDescriptor, SetCounts)], filename: &Path) -> csv::Result<()> {
    // modify the delimiter to "," if it ends with .csv
    let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
    let delimiter: u8 = if is_csv { b',' } else { b'\t' };
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(filename)?;

    for (descriptor, counts) in rows.iter() {
        let row = CountRow {
            pipeline: descriptor.label(),
            caller: descriptor.caller().to_string(),
            mapper: descriptor.mapper().to_string(),
            total_variants: counts.total,
            snps: counts.snps,
            indels: counts.indels
        };
        csv_writer.serialize(&row)?;
    }

    // save everything
    csv_writer.flush()?;
    Ok(())
}
