use serde::{Deserialize, Serialize};
use std::fmt;

/// Expected result of a credential row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Valid,
    Invalid,
}

impl Classification {
    /// Case-insensitive; anything other than "valid" is treated as invalid
    pub fn from_cell(cell: &str) -> Self {
        if cell.trim().eq_ignore_ascii_case("valid") {
            Classification::Valid
        } else {
            Classification::Invalid
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Valid => f.write_str("valid"),
            Classification::Invalid => f.write_str("invalid"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

/// Decision for one data-driven login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub verdict: Verdict,
    /// An authenticated session was left behind and must be logged out
    pub requires_cleanup: bool,
}

impl Outcome {
    /// Failure reason for a failing verdict
    pub fn failure_reason(&self) -> Option<&'static str> {
        match (self.verdict, self.requires_cleanup) {
            (Verdict::Pass, _) => None,
            (Verdict::Fail, true) => {
                Some("Login succeeded with invalid credentials - Security Issue!")
            }
            (Verdict::Fail, false) => Some("Login failed with valid credentials"),
        }
    }
}

/// Evaluate an observed login against the expected classification.
///
/// A logged-in session always needs cleanup, including the failing case where invalid
/// credentials were accepted.
pub fn evaluate(expected: Classification, observed_logged_in: bool) -> Outcome {
    let verdict = match (expected, observed_logged_in) {
        (Classification::Valid, true) | (Classification::Invalid, false) => Verdict::Pass,
        (Classification::Valid, false) | (Classification::Invalid, true) => Verdict::Fail,
    };
    Outcome {
        verdict,
        requires_cleanup: observed_logged_in,
    }
}
