pub mod types;
pub mod classification;

pub use types::FinderError;
pub use classification::{ErrorClassification, ErrorKind};
