//! independence::outcome — immutable result of an independence test.
//!
//! Purpose
//! -------
//! Carry everything a `test` call produces (statistic, p-value, optional
//! null distribution, the strategy used, advisories) as one value, so
//! callers never read mutable "last result" state off a test object.
//!
//! Conventions
//! -----------
//! - `null_dist` is `Some` exactly when `method` is
//!   [`TestMethod::Permutation`]; its length equals the replication count.
//! - Advisories are informational; they are also emitted as `tracing`
//!   warnings at the point they arise.

/// Strategy that produced the p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestMethod {
    /// Permutation test with the given number of replications.
    Permutation { reps: usize },
    /// Moment-matched χ²₁ approximation.
    ChiSquared,
}

/// Non-fatal remarks about a test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// Fewer than 1000 replications; the p-value may be imprecise.
    LowReps { reps: usize },
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::LowReps { reps } => write!(
                f,
                "The number of replications is low (under 1000), and p-value \
                 calculations may be unreliable. Use the p-value result, with caution! \
                 (reps = {reps})"
            ),
        }
    }
}

/// IndependenceOutcome — statistic and p-value of one test call.
///
/// Fields
/// ------
/// - `stat`: observed test statistic.
/// - `pvalue`: p-value in `(0, 1]`.
/// - `null_dist`: permutation null statistics (`None` for χ²).
/// - `method`: strategy used.
/// - `advisories`: non-fatal remarks (e.g. under-powered `reps`).
#[derive(Debug, Clone, PartialEq)]
pub struct IndependenceOutcome {
    pub stat: f64,
    pub pvalue: f64,
    pub null_dist: Option<Vec<f64>>,
    pub method: TestMethod,
    pub advisories: Vec<Advisory>,
}

impl IndependenceOutcome {
    /// `(stat, pvalue)` pair, the shape returned to Python callers.
    pub fn as_pair(&self) -> (f64, f64) {
        (self.stat, self.pvalue)
    }

    pub fn is_permutation(&self) -> bool {
        matches!(self.method, TestMethod::Permutation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advisory_message_mentions_reps() {
        let msg = Advisory::LowReps { reps: 100 }.to_string();
        assert!(msg.contains("under 1000") && msg.contains("reps = 100"), "Got: {msg}");
    }

    #[test]
    fn outcome_pair_and_method() {
        let outcome = IndependenceOutcome {
            stat: 0.5,
            pvalue: 0.01,
            null_dist: None,
            method: TestMethod::ChiSquared,
            advisories: Vec::new(),
        };
        assert_eq!(outcome.as_pair(), (0.5, 0.01));
        assert!(!outcome.is_permutation());
    }
}
