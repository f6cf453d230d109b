pub mod activity;
pub mod file_log;

pub use activity::{ActivityEntry, ActivitySink, NoopActivityLog};
pub use file_log::FileActivityLog;
