/// Core types shared across all Taxonomer modules
pub mod rank;
pub mod taxonomy;

// Re-export commonly used types at module level
pub use rank::{RankVocabulary, ROOT_NAME, UNDEFINED_RANK};
pub use taxonomy::Source;
