//! Poseidon parameters for the two Pasta fields.
//!
//! Parameters are derived on demand and owned by the caller; the setup of the
//! folding scheme builds them once and hands out references.

use crate::{constants::PlonkSpongeConstants, poseidon::ArithmeticSpongeParams};
use sangria_curves::pasta::{Fp, Fq};

pub const FP_TAG: &str = "sangria/poseidon/fp";
pub const FQ_TAG: &str = "sangria/poseidon/fq";

pub fn fp_params() -> ArithmeticSpongeParams<Fp> {
    ArithmeticSpongeParams::generate::<PlonkSpongeConstants>(FP_TAG)
}

pub fn fq_params() -> ArithmeticSpongeParams<Fq> {
    ArithmeticSpongeParams::generate::<PlonkSpongeConstants>(FQ_TAG)
}
