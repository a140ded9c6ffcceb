//! Service layer: story aggregation and media publication

pub mod aggregator;
pub mod host;
pub mod publisher;

pub use aggregator::StoryAggregator;
pub use host::{MediaHost, TmpFilesHost};
pub use publisher::MediaPublisher;
