//! Utilities shared by the Sangria crates.

pub mod field_helpers;
pub mod math;
pub mod serialization;

pub use field_helpers::{FieldHelpers, FieldHelpersError};

/// Helpers used by the tests of every crate of the workspace.
pub mod tests {
    use rand::{rngs::StdRng, RngCore, SeedableRng};

    /// A seeded RNG. Without a seed, one is drawn at random and printed so
    /// that failures can be replayed.
    pub fn make_test_rng(seed: Option<[u8; 32]>) -> StdRng {
        let seed = seed.unwrap_or_else(|| {
            let mut seed = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut seed);
            seed
        });
        println!("Test RNG seed: {}", hex::encode(seed));
        StdRng::from_seed(seed)
    }
}
