//! Commitments for the Sangria folding scheme.
//!
//! Vectors are committed with Pedersen commitments `Σ vᵢ·Gᵢ + ρ·H` over a
//! transparent key ([srs::SRS]). The generators are read as the Lagrange basis
//! of an evaluation domain, so a committed vector is also a polynomial in
//! evaluation form and can be opened at arbitrary points with the inner
//! product argument of [ipa].

pub mod commitment;
pub mod error;
pub mod ipa;
pub mod srs;
pub mod utils;

pub use commitment::{combine, CommitmentCurve};
pub use error::CommitmentError;
pub use ipa::{Evaluation, OpeningProof};
pub use srs::SRS;
