//! Report lifecycle engine for Yantek and connection reports.

pub mod blob_store;
pub mod config;
pub mod engine;
pub mod error;
pub mod id_allocator;
pub mod image;
pub mod ledger;
pub mod lifecycle;
pub mod memory;
pub mod observability;
pub mod query_view;
mod session;
pub mod stager;

pub use blob_store::LocalBlobStore;
pub use config::{ConfigError, LifecycleConfig};
pub use engine::ReportEngine;
pub use error::AllocationError;
pub use id_allocator::SequentialIdAllocator;
pub use image::PassthroughImageProcessor;
pub use ledger::{ActivityLedger, LedgerEntry};
pub use lifecycle::ReportLifecycle;
pub use query_view::{ReportQueryView, ReportSummary};
pub use stager::{ArtifactStager, StagedArtifact, StagedArtifacts};

#[cfg(test)]
pub mod test_utils;
