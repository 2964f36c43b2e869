pub mod suite;
pub mod types;

pub use suite::{parse_suite_content, parse_suite_file};
pub use types::{GroupFilter, ParallelMode, Suite, SuiteContext};
