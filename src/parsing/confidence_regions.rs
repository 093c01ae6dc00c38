
use anyhow::Context;
use coitrees::{COITree, Interval, IntervalTree};
use log::debug;
use noodles::bed::io::reader::Builder as BedBuilder;
use noodles::bed::{io::Reader as BedReader, Record as BedRecord};
use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::Path;

use crate::parsing::chromosomes::normalize_chromosome;

/// Wrapper function that handles both gzip compressed and uncompressed BED files
/// # Arguments
/// * `filename` - path to the .bed(.gz) file to open
pub fn open_bed_file(filename: &Path) -> anyhow::Result<BedReader<3, BufReader<Box<dyn std::io::Read>>>> {
    let is_compressed = match filename.extension() {
        Some(extension) => {
            extension == "gz"
        },
        None => false
    };

    let buf_reader: Box<dyn std::io::Read> = if is_compressed {
        #[allow(clippy::default_constructed_unit_structs)]
        let bgzf_reader = noodles::bgzf::io::reader::Builder::default()
            .build_from_path(filename)
            .with_context(|| format!("Error while loading {filename:?}:"))?;
        Box::new(bgzf_reader)
    } else {
        Box::new(std::fs::File::open(filename)?)
    };

    #[allow(clippy::default_constructed_unit_structs)]
    let bed_reader = BedBuilder::<3>::default()
        .build_from_reader(buf_reader);
    Ok(bed_reader)
}

/// A pre-loaded confidence-region file, queryable by containment.
/// Chromosome tokens are normalized on load so queries work across naming schemes.
#[derive(Clone)]
pub struct ConfidenceRegions {
    /// Lookup from a normalized chromosome to a COITree, which has 0-based inclusive ranges
    lookup_trees: BTreeMap<String, COITree<(), usize>>,
    /// Total intervals held across all chromosomes
    interval_count: usize
}

impl std::fmt::Debug for ConfidenceRegions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // COITree does not have Debug, so lets just convert it to a length for simplicity
        let lookup_counts: BTreeMap<String, usize> = self.lookup_trees.iter()
            .map(|(s, c)| {
                (s.clone(), c.len())
            })
            .collect();
        f.debug_struct("ConfidenceRegions").field("lookup_trees_len", &lookup_counts).finish()
    }
}

impl ConfidenceRegions {
    /// Loads a BED file and converts all the entries to the COI trees for lookup.
    /// Input intervals are half-open `[start, end)`; zero-length rows are skipped.
    /// # Arguments
    /// * `bed_fn` - path to the .bed(.gz) file to load
    /// # Errors
    /// * if the file cannot be opened or a row cannot be parsed
    pub fn from_bed(bed_fn: &Path) -> anyhow::Result<Self> {
        debug!("Pre-loading {bed_fn:?}...");
        let mut bed_handle = open_bed_file(bed_fn)?;

        // gather the raw intervals per normalized chromosome
        let mut record = BedRecord::<3>::default();
        let mut raw_intervals: BTreeMap<String, Vec<Interval<()>>> = Default::default();
        let mut interval_count = 0;
        while bed_handle.read_record(&mut record)? > 0 {
            let chrom = normalize_chromosome(&String::from_utf8_lossy(record.reference_sequence_name()));
            let start = record.feature_start()
                .with_context(|| format!("Error while parsing start for record: {record:?}"))?;
            let end = record.feature_end()
                .unwrap_or(Err(std::io::Error::other("Missing end")))
                .with_context(|| format!("Error while parsing end for record: {record:?}"))?;

            // the parsed positions are 1-based inclusive, convert to 0-based inclusive
            let first = start.get() as i32 - 1;
            let last = end.get() as i32 - 1;
            if last < first {
                debug!("Skipping zero-length confidence interval: {record:?}");
                continue;
            }

            raw_intervals.entry(chrom).or_default().push(Interval::new(first, last, ()));
            interval_count += 1;
        }

        // now build one search tree per chromosome
        let mut lookup_trees: BTreeMap<String, COITree<(), usize>> = Default::default();
        for (chrom, intervals) in raw_intervals.into_iter() {
            let coi_tree = COITree::new(&intervals);
            assert!(lookup_trees.insert(chrom, coi_tree).is_none());
        }

        Ok(Self {
            lookup_trees,
            interval_count
        })
    }

    /// Returns true if the provided span is fully contained in at least one confidence interval.
    /// These are based on 0-based inclusive lookups.
    /// # Arguments
    /// * `chrom` - the chromosome, normalized or not
    /// * `first` - the first included base, 0-based
    /// * `last` - the last included base, 0-based
    pub fn contains_span(&self, chrom: &str, first: i32, last: i32) -> bool {
        match self.lookup_trees.get(&normalize_chromosome(chrom)) {
            Some(coi_tree) => {
                let mut included = false;
                coi_tree.query(first, last, |i| {
                    if i.first <= first && i.last >= last {
                        included = true;
                    }
                });
                included
            },
            None => false
        }
    }

    // getters
    pub fn interval_count(&self) -> usize {
        self.interval_count
    }
}
