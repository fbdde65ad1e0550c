//! # Blood Match
//!
//! Blood group compatibility engine and the matching logic of a blood
//! donation coordination platform.
//!
//! ## Features
//!
//! - Donor to recipient ABO/Rh compatibility table and queries
//! - Canonical blood group labels (`A+`, `AB-`, ...) with lenient parsing
//! - Filtering of open requests a donor can serve
//! - Lookup of available donors for a recipient blood group
//! - Live map view model: donor/request markers, summary counts, bounds
//! - JSON and CSV dataset loading, HTML/CSV/TSV/JSON reports

pub mod compatibility;
pub mod config;
pub mod discovery;
pub mod error;
pub mod locations;
pub mod matching;
pub mod output;
pub mod parsers;
pub mod types;

// Re-export key types
pub use compatibility::{
    can_donate_to_receiver, format_label, format_wire_label, is_compatible, CompatibilityTable,
};
pub use config::{FileConfig, Settings};
pub use discovery::FileDiscovery;
pub use error::{BloodMatchError, ParseBloodGroupError};
pub use locations::{LocationSummary, MapBounds, MapReport, MarkerView};
pub use matching::{DonorFinder, DonorMatch, DonorReport, MatchReport, RequestMatcher};
pub use output::{ReportFormat, ReportGenerator, TabularReport};
pub use parsers::{Dataset, DatasetFormat, DatasetParser};
pub use types::*;
