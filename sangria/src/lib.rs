//! Sangria: incrementally verifiable computation by folding instances of a
//! relaxed PLONK relation over a 2-cycle of curves.
//!
//! Each step of the computation is proven by an augmented circuit that
//! runs the user step function and verifies, in-circuit, the fold of the
//! previous instance of the other side of the cycle into its running
//! instance. The two sides alternate between the two fields of the cycle, so
//! every in-circuit group operation is native. At the end, the two running
//! instances are proven with a PLONK-style SNARK over an IPA commitment.
//!
//! The main entry points are:
//! - [setup::PublicParams::setup], which builds the shapes of both augmented
//!   circuits, their commitment keys and the parameter digest;
//! - [ivc::RecursiveSnark], the accumulator, with `new`, `prove_step` and
//!   `verify`;
//! - [compression::CompressedSnark], the succinct proof of the accumulator.

pub mod arithmetization;
pub mod circuits;
pub mod compression;
pub mod curve;
pub mod decider;
pub mod error;
pub mod ivc;
pub mod nifs;
pub mod setup;
pub mod transcript;

pub use error::{IvcError, Result, SangriaError};

/// Number of columns of the PLONK arithmetization.
pub const NUMBER_OF_COLUMNS: usize = 3;

/// Number of public inputs of the augmented circuits: the hash forwarded
/// from the other side and the hash of the new state.
pub const NUMBER_OF_PUBLIC_INPUTS: usize = 2;

/// Number of bits kept from the hashes of the public IO. 250 bits embed
/// in both fields of the cycle.
pub const HASH_BITS: usize = 250;

/// Number of bits of the folding challenges.
pub const CHALLENGE_BITS: usize = sangria_poseidon::sponge::CHALLENGE_BITS;

/// Bit length used for the unique decomposition of a squeezed field element
/// in circuits. It is the bit length of the Pasta moduli minus one.
pub const DECOMPOSITION_BITS: usize = 254;

/// Limbs used by circuits to represent elements of the other field.
pub const LIMB_BITS: usize = 64;
pub const NUMBER_OF_LIMBS: usize = 4;
