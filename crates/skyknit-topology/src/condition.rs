//! Named conditions attached to `CONDITIONAL` compatibility entries.
//!
//! Tables refer to a condition by identifier; the identifier must resolve to
//! a variant here or the registry refuses to load. Evaluation is deferred to
//! the checker, which has the edge counts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Three-needle bind-off: both live edges carry the same count.
    EqualLiveCounts,
}

vocabulary!(Condition {
    EqualLiveCounts => "equal_live_counts",
});

impl Condition {
    /// Whether a join with these edge counts satisfies the condition.
    pub fn holds(self, count_a: u32, count_b: u32) -> bool {
        match self {
            Self::EqualLiveCounts => count_a == count_b,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::EqualLiveCounts => "both edges must carry the same live stitch count",
        }
    }
}
