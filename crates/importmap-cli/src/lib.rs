//! Library surface of the `importmap` binary: configuration, logging and the
//! import session that drives one file through matching, validation and export.

pub mod config;
pub mod logging;
pub mod session;
