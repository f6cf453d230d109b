pub mod events;
pub mod orchestrator;
pub mod state;

pub use events::PipelineEvent;
pub use orchestrator::FinderPipeline;
pub use state::{ExportFailure, PipelineConfig, RunSummary};
