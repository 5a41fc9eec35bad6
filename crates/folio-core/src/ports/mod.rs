pub mod aggregate_store;
pub mod catalog;
pub mod progress;

pub use aggregate_store::{AggregateStore, RepoError};
pub use catalog::{CatalogSource, SourceError};
pub use progress::{NoopReporter, ProgressReporter};
