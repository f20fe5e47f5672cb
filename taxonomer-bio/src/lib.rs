//! Taxonomy sources for Taxonomer
//!
//! Provider-specific ingestion into a [`taxonomer_storage::TaxDb`], flat
//! taxtable reading and the blocking fetch used to obtain source archives.

pub mod download;
pub mod formats;
pub mod providers;

// Re-export commonly used types
pub use download::fetch_url;
pub use formats::Taxtable;
pub use providers::greengenes::{self, IngestOutcome, IngestSummary};
