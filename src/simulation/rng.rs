//! Seed derivation for the spawner and per-train random sources
//!
//! Each thread owns its own `StdRng` so no random state is shared. Seeds are
//! derived from one run seed so a run can be replayed up to thread
//! interleaving.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::TrainId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Stream reserved for the spawner; trains use their id + 1.
const SPAWNER_STREAM: u64 = 0;

/// Use the configured seed, or draw one from the thread-local generator
pub fn resolve_run_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::rng().random())
}

fn stream_rng(run_seed: u64, stream: u64) -> StdRng {
    StdRng::seed_from_u64(run_seed ^ stream.wrapping_mul(MIXING_CONSTANT))
}

pub fn spawner_rng(run_seed: u64) -> StdRng {
    stream_rng(run_seed, SPAWNER_STREAM)
}

pub fn train_rng(run_seed: u64, train_id: TrainId) -> StdRng {
    stream_rng(run_seed, train_id.0 .0 as u64 + 1)
}
