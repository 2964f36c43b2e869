pub mod cases;
pub mod data;
pub mod driver;
pub mod error;
pub mod pages;
pub mod parser;
pub mod report;
pub mod runner;
pub mod utils;

// Re-export common items
pub use error::{HarnessError, HarnessResult};
pub use report::generate_report;
pub use runner::{run_suites, RunOptions};
