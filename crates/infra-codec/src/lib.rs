// Divider Infrastructure - Job & Result Codecs
// Implements: JobSource (streaming JSON), ResultSink (CSV)

pub mod csv_sink;
pub mod json_source;

pub use csv_sink::{CsvResultSink, CSV_HEADER};
pub use json_source::JsonJobSource;
