//! Format checks for mapped import columns.
//!
//! Once every caption is confirmed, [`validate`] checks the values mapped to
//! captions that have a known format (email, phone, employee id, reference,
//! username, start date) and reports the failing rows. Issues are
//! informational and never block export. [`apply_correction`] rewrites a
//! single cell and updates the report in place.

mod correction;
mod error;
mod report;
mod rules;

pub use correction::{Correction, apply_correction};
pub use error::{CorrectionError, ValidateError};
pub use report::{ValidationReport, validate};
pub use rules::FieldRule;
