pub mod matcher;
pub mod walker;
pub mod coordinator;

pub use matcher::{matches_client, matches_types, TypeFilter};
pub use walker::{months_to_process, walk_manager, WalkFilter};
pub use coordinator::{discover_managers, ProgressCallback, ScanCoordinator, ScanOutcome, TaskWarning};
