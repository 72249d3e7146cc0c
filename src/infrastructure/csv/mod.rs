// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Encoding fallback, CSV parsing and clean table persistence

mod clean_sink;
mod csv_parser;
mod encoding;

pub use clean_sink::CleanTableSink;
pub use csv_parser::{CsvParser, LoadedTable};
pub use encoding::SourceEncoding;
