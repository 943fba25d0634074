pub mod catalog;
pub mod decode;
pub mod error;
pub mod fetch;
pub mod job;
pub mod mirror;
pub mod result;
pub mod rewrite;
pub mod storage;

pub use error::MirrorError;
pub use job::MirrorJob;
pub use mirror::{FetchOutcome, Mirror, ProgressCallback};
pub use result::{MirrorSummary, PageResult};
