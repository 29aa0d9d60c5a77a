//! The random source of a simulation.
//!
//! Every `Simulation` owns exactly one [`SimRng`], seeded from a `u64`. All randomness in a run
//! (trait sampling at construction, death draws, contact counts, target selection and
//! exposure draws) is pulled from that one generator in a fixed order, so a run is fully
//! determined by its parameters and seed. Nothing here touches global state other than
//! [`draw_seed`], which is only consulted when no seed was supplied.

use log::trace;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// The generator type owned by a simulation.
pub type SimRng = SmallRng;

/// Upper bound (inclusive) of freshly drawn seeds.
pub const MAX_DRAWN_SEED: u64 = 10_000_000;

/// Creates the generator for a run from its seed.
#[must_use]
pub fn rng_from_seed(seed: u64) -> SimRng {
    trace!("initializing random source with seed {seed}");
    SimRng::seed_from_u64(seed)
}

/// Draws a new seed in `0..=MAX_DRAWN_SEED` from the thread-local entropy source.
#[must_use]
pub fn draw_seed() -> u64 {
    rand::rng().random_range(0..=MAX_DRAWN_SEED)
}

/// Sample a random element uniformly from a container of known length.
///
/// We do not assume the container is randomly indexable, only that it can be iterated over.
/// Returns `None` when the iterator is empty.
pub fn sample_single_from_known_length<I, R, T>(rng: &mut R, mut iter: I) -> Option<T>
where
    R: Rng,
    I: Iterator<Item = T> + ExactSizeIterator<Item = T>,
{
    let len = iter.len();
    if len == 0 {
        return None;
    }
    let index = rng.random_range(0..len);
    iter.nth(index)
}
