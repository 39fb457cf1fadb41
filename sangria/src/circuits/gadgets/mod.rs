//! Gadgets of the recursive verifier.

pub mod bits;
pub mod ecc;
pub mod nonnative;
pub mod poseidon;

pub use ecc::AllocatedPoint;
pub use nonnative::AllocatedNonNative;
pub use poseidon::PoseidonGadget;
