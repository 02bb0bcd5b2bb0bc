//! Report output
//!
//! - [`text`]: human-readable results on stdout
//! - [`json`]: machine-readable report file

pub mod json;
pub mod text;
