pub mod aggregation;
pub mod credit_aggregator;
pub mod passthrough;
pub mod run_state;
pub mod track_merger;

pub use aggregation::{AggregationService, PipelineConfig, RunOutcome};
pub use credit_aggregator::{CreditAggregator, aggregate_credits};
pub use passthrough::merge_json_if_larger;
pub use run_state::{LogEntry, LogLevel, RunPhase, RunState};
pub use track_merger::{MatchStrategy, TrackMerger, merge_tracks};
