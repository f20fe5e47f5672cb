//! Core utilities and types shared across all Taxonomer crates

pub mod config;
pub mod error;
pub mod logging;
pub mod system;
pub mod types;

// Re-export commonly used types
pub use config::{load_config, save_config, Config};
pub use error::{TaxonomerError, TaxonomerResult};
pub use logging::init_logging;

// Re-export core types
pub use types::{RankVocabulary, Source, ROOT_NAME, UNDEFINED_RANK};

// Re-export system utilities
pub use system::{default_database_path, taxonomer_cache_dir, taxonomer_home};
