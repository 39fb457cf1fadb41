//! This crate provides a generic implementation of the Poseidon hash function
//! and of the Fiat-Shamir sponge [FqSponge](crate::sponge::FqSponge) used to
//! derive challenges from curve points.
//!
//! Parameters for the Pasta fields are derived in [crate::pasta]. They are
//! plain values: callers own them and lend them to sponges, e.g.
//! ```rust
//! use sangria_curves::pasta::Vesta;
//! use sangria_poseidon::{
//!     constants::PlonkSpongeConstants, pasta::fq_params, sponge::DefaultFqSponge, FqSponge,
//! };
//!
//! let params = fq_params();
//! let mut sponge = DefaultFqSponge::<Vesta, PlonkSpongeConstants>::new(&params);
//! let challenge = sponge.challenge();
//! ```

pub mod constants;
pub mod pasta;
pub mod permutation;
pub mod poseidon;
pub mod sponge;

pub use sponge::FqSponge; // Commonly used so reexported for convenience
