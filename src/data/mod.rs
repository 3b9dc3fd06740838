/// In-memory categorical dataset
pub mod dataset;
/// Delimited-file loading
pub mod reader;
