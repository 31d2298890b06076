//! Log search: export query construction and hit decoding

mod query;
mod result;

pub use query::{shift_timestamp, ExportSettings};
pub use result::{LogRecord, SearchResult};
