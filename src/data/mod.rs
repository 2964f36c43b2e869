pub mod records;
pub mod generator;

use crate::runner::outcome::Classification;
use serde::{Deserialize, Serialize};

pub use records::CsvRecordSource;

/// One credential/expectation record driving a data-driven login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRow {
    pub email: String,
    pub password: String,
    pub expected: Classification,
}
