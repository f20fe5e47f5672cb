//! Provider-specific ingestion pipelines

pub mod greengenes;
