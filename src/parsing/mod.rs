/*!
# Parsing module
Contains the logic for parsing input files into meaningful structs / data.
*/
/// Chromosome token normalization and ordering
pub mod chromosomes;
/// Parser for the confidence regions that enables lookups afterwards
pub mod confidence_regions;
/// Streams variant-call files into loaded variant sets
pub mod vcf_loader;
