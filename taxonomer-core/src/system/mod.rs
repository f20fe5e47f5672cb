pub mod paths;

// Re-export commonly used functions
pub use paths::{default_database_path, taxonomer_cache_dir, taxonomer_home};
