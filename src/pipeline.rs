//! The generic catalog pipeline: pagination, dedup/sort, index derivation, and the job
//! runner tying them to the store.

pub mod index;
pub mod job;
pub mod order;
pub mod paginator;

pub use job::{run_job, CatalogJob, JobContext, Normalizer, PostProcess, SyncReport};
pub use paginator::{PageBatch, Paginator};
