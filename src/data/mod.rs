//! Data acquisition: download (`fetch`) and XLSX decoding (`workbook`).

pub mod fetch;
pub mod workbook;

pub use fetch::{FetchError, Fetcher};
pub use workbook::read_records;
