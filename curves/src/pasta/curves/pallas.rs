use crate::pasta::{Fp, Fq};
use ark_ec::{
    models::short_weierstrass::{Affine, Projective, SWCurveConfig},
    CurveConfig,
};
use ark_ff::{MontFp, Zero};

/// G_GENERATOR_X = 1
pub const G_GENERATOR_X: Fp = MontFp!("1");

/// G_GENERATOR_Y =
/// 12418654782883325593414442427049395787963493412651469444558597405572177144507
pub const G_GENERATOR_Y: Fp =
    MontFp!("12418654782883325593414442427049395787963493412651469444558597405572177144507");

#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct PallasParameters;

impl CurveConfig for PallasParameters {
    type BaseField = Fp;
    type ScalarField = Fq;

    /// COFACTOR = 1
    const COFACTOR: &'static [u64] = &[0x1];

    /// COFACTOR_INV = 1
    const COFACTOR_INV: Fq = MontFp!("1");
}

pub type Pallas = Affine<PallasParameters>;
pub type ProjectivePallas = Projective<PallasParameters>;

impl SWCurveConfig for PallasParameters {
    /// COEFF_A = 0
    const COEFF_A: Fp = MontFp!("0");

    /// COEFF_B = 5
    const COEFF_B: Fp = MontFp!("5");

    const GENERATOR: Pallas = Pallas::new_unchecked(G_GENERATOR_X, G_GENERATOR_Y);

    #[inline(always)]
    fn mul_by_a(_: Self::BaseField) -> Self::BaseField {
        Self::BaseField::zero()
    }
}
