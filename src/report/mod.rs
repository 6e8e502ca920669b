//! Run reports
//!
//! Serializable record of a finished probe run, plus a helper to write it
//! to disk.

pub mod io;
pub mod result;

pub use io::write_report;
pub use result::RunReport;
