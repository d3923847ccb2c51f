//! Provider plumbing: endpoint descriptors, the HTTP client, request metrics,
//! and client options.

pub mod client;
pub mod endpoint;
pub mod metrics;
pub mod options;

pub use client::{PageSource, ProviderClient};
pub use endpoint::Endpoint;
pub use metrics::ProviderMetricsSnapshot;
pub use options::ProviderClientOptions;
