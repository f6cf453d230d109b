pub mod commands;
pub mod find;
pub mod progress;

pub use commands::{Cli, Commands};
