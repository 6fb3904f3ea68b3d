pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod structure;
pub mod transform;
pub mod util;

pub use error::ExtractError;
pub use model::{AggregateReport, ClassEntry, ClassRecord, ReportBuilder, ReportDelta};
pub use structure::{ExtractOptions, Extractor, FileOutcome, extract_project};
