//! Import file ingestion.
//!
//! Turns delimited text into rows, infers one [`ImportColumn`] per column
//! and writes mapped rows back out as delimited text.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use importmap_ingest::{analyze_table, read_import_file};
//! use importmap_model::ImportOptions;
//!
//! let options = ImportOptions::default();
//! let table = read_import_file(Path::new("people.csv"), &options)?;
//! let columns = analyze_table(&table);
//! ```
//!
//! [`ImportColumn`]: importmap_model::ImportColumn

mod codec;
mod error;
mod inference;

// === Error Types ===
pub use error::{CodecError, Result};

// === Codec ===
pub use codec::{SUPPORTED_EXTENSIONS, parse, parse_line, read_import_file, serialize};

// === Column Inference ===
pub use inference::{SAMPLE_SIZE, analyze, analyze_table, infer_type};
