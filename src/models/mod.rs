pub mod record;
pub mod request;
pub mod result_set;

pub use record::*;
pub use request::*;
pub use result_set::*;
