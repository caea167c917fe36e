use std::hash::{BuildHasher, RandomState};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedChoice {
    Cli(u64),
    Generated(u64),
}

impl SeedChoice {
    /// Uses the seed given on the command line, or a fresh one.
    pub fn resolve(cli: Option<u64>) -> Self {
        match cli {
            Some(seed) => Self::Cli(seed),
            None => Self::Generated(generate_runtime_seed()),
        }
    }

    pub fn value(self) -> u64 {
        match self {
            Self::Cli(seed) | Self::Generated(seed) => seed,
        }
    }
}

static RUNS_STARTED: AtomicU64 = AtomicU64::new(0);

/// Fresh run seed from the clock, the process id and a per-process counter,
/// hashed with the std randomly keyed hasher.
pub fn generate_runtime_seed() -> u64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_nanos());
    let run = RUNS_STARTED.fetch_add(1, Ordering::Relaxed);
    RandomState::new().hash_one((now, process::id(), run))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_seed_is_used_as_given() {
        assert_eq!(SeedChoice::resolve(Some(42)), SeedChoice::Cli(42));
        assert_eq!(SeedChoice::resolve(Some(42)).value(), 42);
    }

    #[test]
    fn generated_seeds_differ_between_calls() {
        let first = SeedChoice::resolve(None);
        let second = SeedChoice::resolve(None);
        assert!(matches!(first, SeedChoice::Generated(_)));
        assert_ne!(first.value(), second.value(), "each call hashes a new run counter");
    }
}
