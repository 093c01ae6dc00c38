
/// Command line interface functionality
pub mod cli;
/// Contains the comparison session, its lazy load cache, and the shared error type
pub mod comparator;
/// Contains various shared data types
pub mod data_types;
/// Contains the pure pairwise and partition set math
pub mod overlap_solver;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Expression tree for boolean algebra over variant sets
pub mod set_algebra;
/// Contains the pure truth-scoring math
pub mod truth_solver;
/// Various utility functions that tend to be very generic
pub mod util;
/// All output writers
pub mod writers;
