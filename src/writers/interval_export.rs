

use anyhow::Context;
use noodles::bgzf;
use noodles::core::Position;
use rustc_hash::FxHashSet;
use std::fs::File;
use std::path::Path;

use crate::data_types::variants::VariantKey;
use crate::parsing::chromosomes::chromosome_rank;

/// A contiguous 0-based, half-open reference span on one chromosome
type ReferenceSpan = (String, u64, u64);

/// Collapses variant keys into sorted, merged reference spans.
/// Rows come out in karyotype order; overlapping or abutting spans on the same
/// chromosome merge into one row.
/// # Arguments
/// * `keys` - the variant keys to cover
pub fn merge_reference_spans(keys: &FxHashSet<VariantKey>) -> Vec<ReferenceSpan> {
    let mut ranked_spans: Vec<((usize, String), u64, u64)> = keys.iter()
        .map(|key| {
            let (start, end) = key.reference_span();
            (chromosome_rank(key.chromosome()), start, end)
        })
        .collect();
    ranked_spans.sort();

    let mut merged: Vec<ReferenceSpan> = vec![];
    for ((_, chromosome), start, end) in ranked_spans.into_iter() {
        match merged.last_mut() {
            Some((last_chromosome, _, last_end)) if *last_chromosome == chromosome && start <= *last_end => {
                *last_end = (*last_end).max(end);
            },
            _ => {
                merged.push((chromosome, start, end));
            }
        };
    }
    merged
}

/// Will write the merged reference spans of the given keys as a 3-column BED file.
/// Output is bgzip compressed when the filename ends with .gz.
/// # Arguments
/// * `keys` - the variant keys to cover
/// * `filename` - the filename for the output (.bed or .bed.gz)
/// # Errors
/// * if opening or writing the file throws errors
pub fn write_variant_bed(keys: &FxHashSet<VariantKey>, filename: &Path) -> anyhow::Result<()> {
    let merged_spans = merge_reference_spans(keys);

    let file = File::create(filename)
        .with_context(|| format!("Error while creating {filename:?}:"))?;
    let writer: Box<dyn std::io::Write> = if filename.extension().unwrap_or_default() == "gz" {
        Box::new(bgzf::io::Writer::new(file))
    } else {
        Box::new(file)
    };
    #[allow(clippy::default_constructed_unit_structs)]
    let mut bed_writer = noodles::bed::io::writer::Builder::<3>::default()
        .build_from_writer(writer);

    for (chromosome, start, end) in merged_spans.into_iter() {
        // Position is 1-based in noodles world, the writer moves starts back to 0-based
        let record = noodles::bed::feature::record_buf::RecordBuf::<3>::builder()
            .set_reference_sequence_name(chromosome)
            .set_feature_start(Position::try_from(start as usize + 1)?)
            .set_feature_end(Position::try_from(end as usize)?)
            .build();
        bed_writer.write_feature_record(&record)
            .with_context(|| format!("Error while writing to {filename:?}:"))?;
    }

    Ok(())
}
