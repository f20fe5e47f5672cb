//! SQLite storage for taxonomies
//!
//! Holds the schema, the idempotent loader every ingestion path writes
//! through, the nested-interval hierarchy builder and the read-only
//! ancestor/descendant queries.

pub mod hierarchy;
pub mod loader;
pub mod schema;
pub mod taxdb;
pub mod view;

// Re-export commonly used types
pub use hierarchy::{NestedInterval, TaxonArena, TaxtableRow};
pub use loader::{bulk_insert, has_row, insert_rows, InsertOptions, LoadOutcome, Row};
pub use schema::{tables, PRIMARY_NAME_CLASS};
pub use taxdb::{NameRecord, NodeRecord, TaxDb};
pub use view::LineageEntry;
