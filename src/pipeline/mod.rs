//! Pipeline components: per-item processor, worker pool, hierarchical
//! reducer, orchestrator.

pub mod orchestrator;
pub mod pool;
pub mod processor;
pub mod reduce;

pub use orchestrator::{PipelineReport, filter_valid, run_pipeline, run_pipeline_with_cancel};
pub use pool::{PoolHandles, run_pool, spawn_pool};
pub use processor::{ANALYSIS_FLAGS, FALLBACK_FLAG, process_item};
pub use reduce::{ReduceError, merge_artifacts};
