//! Relaxed PLONK with three columns.
//!
//! A circuit is a matrix of `N` rows: `s` public input rows, `n` gate rows,
//! one reserved row with all selectors set to zero, and zero rows up to the
//! power of two `N`. Every row carries the gate
//!
//! ```text
//! qM·a·b + u·(qL·a + qR·b + qO·c + PI) + u²·qC + E = 0
//! ```
//!
//! where `PI = -x` on the public input rows (which have `qL = 1`) and `0`
//! elsewhere, and the copy constraints are a permutation `σ` over the `3N`
//! cells. A plain instance is the special case `u = 1`, `E = 0`.

pub mod builder;
pub mod instance;
pub mod structure;

pub use builder::{CircuitBuilder, Selectors, Variable};
pub use instance::{
    is_sat_plain, is_sat_relaxed, relax, PlainInstance, PlainWitness, RelaxedInstance,
    RelaxedWitness,
};
pub use structure::CircuitStructure;

/// Index of a cell of the matrix in a flat vector of the three columns.
pub fn cell_index(domain_size: usize, column: usize, row: usize) -> usize {
    column * domain_size + row
}
