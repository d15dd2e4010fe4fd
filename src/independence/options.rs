//! independence::options — validated configuration for significance tests.
//!
//! Purpose
//! -------
//! Hold the knobs of a `test` call (`reps`, `workers`, `auto`,
//! `perm_blocks`, `random_seed`) in validated, strongly typed form so the
//! test drivers never see out-of-range values.
//!
//! Key behaviors
//! -------------
//! - [`Reps`]: strictly positive replication count; parses from text and
//!   flags under-powered values (`< 1000`).
//! - [`Workers`]: sequential, all cores (`-1`), or an explicit thread
//!   count.
//! - [`TestOptions`]: bundle with documented defaults and a `new`
//!   constructor taking `Option`s.
//!
//! Conventions
//! -----------
//! - Integer inputs are taken as `i64` so that negative values coming from
//!   Python reach validation instead of failing a conversion.
use crate::independence::errors::{IndepError, IndepResult};
use ndarray::Array2;
use std::str::FromStr;

/// Replication count below which permutation p-values are flagged as
/// under-powered.
pub const MIN_POWERED_REPS: usize = 1000;

/// Number of permutation replications (always `≥ 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reps(usize);

impl Reps {
    /// Validate a replication count.
    ///
    /// # Errors
    /// - [`IndepError::InvalidReps`] when `value < 1`.
    pub fn new(value: i64) -> IndepResult<Self> {
        if value < 1 {
            return Err(IndepError::InvalidReps { value: value.to_string() });
        }
        let reps =
            usize::try_from(value).map_err(|_| IndepError::InvalidReps { value: value.to_string() })?;
        Ok(Reps(reps))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// `true` when the count is too small for a reliable p-value.
    pub fn is_underpowered(self) -> bool {
        self.0 < MIN_POWERED_REPS
    }
}

impl Default for Reps {
    fn default() -> Self {
        Reps(MIN_POWERED_REPS)
    }
}

impl FromStr for Reps {
    type Err = IndepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: i64 =
            trimmed.parse().map_err(|_| IndepError::InvalidReps { value: format!("{s:?}") })?;
        Reps::new(value)
    }
}

/// Degree of parallelism for the permutation strategy.
///
/// - `Sequential`: run every replication on the calling thread (`1`).
/// - `AllCores`: one worker per available core (`-1`).
/// - `Threads(k)`: exactly `k > 1` workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Workers {
    #[default]
    Sequential,
    AllCores,
    Threads(usize),
}

impl Workers {
    /// Map the conventional integer encoding onto [`Workers`].
    ///
    /// # Errors
    /// - [`IndepError::InvalidWorkers`] for `0` and any value below `-1`.
    pub fn new(value: i64) -> IndepResult<Self> {
        match value {
            1 => Ok(Workers::Sequential),
            -1 => Ok(Workers::AllCores),
            k if k > 1 => usize::try_from(k)
                .map(Workers::Threads)
                .map_err(|_| IndepError::InvalidWorkers { value }),
            _ => Err(IndepError::InvalidWorkers { value }),
        }
    }

    /// Number of threads this setting resolves to on the current machine.
    pub fn threads(self) -> usize {
        match self {
            Workers::Sequential => 1,
            Workers::Threads(k) => k,
            Workers::AllCores => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

/// Options of a single `test` call.
///
/// Fields
/// ------
/// - `reps`: permutation replications (default 1000).
/// - `workers`: parallelism of the permutation strategy (default
///   sequential).
/// - `auto`: allow the χ² approximation and the fast 1-D path when
///   applicable (default `true`).
/// - `perm_blocks`: optional `n×k` exchangeability labels; forces the
///   permutation strategy.
/// - `random_seed`: base seed for reproducible permutations; drawn from
///   the thread RNG when `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TestOptions {
    pub reps: Reps,
    pub workers: Workers,
    pub auto: bool,
    pub perm_blocks: Option<Array2<i64>>,
    pub random_seed: Option<u64>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            reps: Reps::default(),
            workers: Workers::default(),
            auto: true,
            perm_blocks: None,
            random_seed: None,
        }
    }
}

impl TestOptions {
    /// Construct validated options, filling `None`s with defaults.
    ///
    /// # Errors
    /// - [`IndepError::InvalidReps`] / [`IndepError::InvalidWorkers`] for
    ///   out-of-range values.
    pub fn new(
        reps: Option<i64>, workers: Option<i64>, auto: Option<bool>,
        perm_blocks: Option<Array2<i64>>, random_seed: Option<u64>,
    ) -> IndepResult<Self> {
        let reps = reps.map(Reps::new).transpose()?.unwrap_or_default();
        let workers = workers.map(Workers::new).transpose()?.unwrap_or_default();
        Ok(Self { reps, workers, auto: auto.unwrap_or(true), perm_blocks, random_seed })
    }

    /// Base seed for this call: the configured one, or a fresh random one.
    pub fn resolve_seed(&self) -> u64 {
        self.random_seed.unwrap_or_else(rand::random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Reps validation from integers and text, and the power advisory.
    // - Workers encoding.
    // - TestOptions defaults.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Negative, zero and non-integer replication counts are parameter
    // failures; 100 is accepted but under-powered.
    fn reps_validation_and_advisory() {
        assert!(matches!(Reps::new(-1), Err(IndepError::InvalidReps { .. })));
        assert!(matches!(Reps::new(0), Err(IndepError::InvalidReps { .. })));
        assert!(matches!("1.5".parse::<Reps>(), Err(IndepError::InvalidReps { .. })));
        assert!(matches!("ten".parse::<Reps>(), Err(IndepError::InvalidReps { .. })));

        let hundred = Reps::new(100).unwrap();
        assert!(hundred.is_underpowered());
        assert!(!Reps::default().is_underpowered());
        assert_eq!(" 250 ".parse::<Reps>().unwrap().get(), 250);
    }

    #[test]
    fn workers_encoding() {
        assert_eq!(Workers::new(1).unwrap(), Workers::Sequential);
        assert_eq!(Workers::new(-1).unwrap(), Workers::AllCores);
        assert_eq!(Workers::new(4).unwrap(), Workers::Threads(4));
        assert!(Workers::AllCores.threads() >= 1);
        for bad in [0, -2, -100] {
            assert_eq!(Workers::new(bad), Err(IndepError::InvalidWorkers { value: bad }));
        }
    }

    #[test]
    // Purpose
    // -------
    // `new` with all `None`s yields the documented defaults, and agrees
    // with `Default` apart from the seed.
    fn test_options_defaults() {
        // Arrange / Act
        let opts = TestOptions::new(None, None, None, None, Some(7)).unwrap();

        // Assert
        assert_eq!(opts.reps.get(), 1000);
        assert_eq!(opts.workers, Workers::Sequential);
        assert!(opts.auto);
        assert!(opts.perm_blocks.is_none());
        assert_eq!(opts.resolve_seed(), 7);
        assert_eq!(TestOptions { random_seed: Some(7), ..TestOptions::default() }, opts);
    }
}
