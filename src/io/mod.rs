//! Tabular Input/Output
//!
//! CSV reading of input records and persistence of the success/failure
//! partitions. An unreadable input table is the one batch-wide fatal
//! condition in this layer; output serialization failures are hard errors
//! too, never silent.

pub mod reader;
pub mod writer;

pub use reader::read_records;
pub use writer::{ResultWriter, WrittenFiles};
