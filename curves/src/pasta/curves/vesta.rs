use crate::pasta::{Fp, Fq};
use ark_ec::{
    models::short_weierstrass::{Affine, Projective, SWCurveConfig},
    CurveConfig,
};
use ark_ff::{MontFp, Zero};

/// G_GENERATOR_X = 1
pub const G_GENERATOR_X: Fq = MontFp!("1");

/// G_GENERATOR_Y =
/// 11426906929455361843568202299992114520848200991084027513389447476559454104162
pub const G_GENERATOR_Y: Fq =
    MontFp!("11426906929455361843568202299992114520848200991084027513389447476559454104162");

#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct VestaParameters;

impl CurveConfig for VestaParameters {
    type BaseField = Fq;
    type ScalarField = Fp;

    /// COFACTOR = 1
    const COFACTOR: &'static [u64] = &[0x1];

    /// COFACTOR_INV = 1
    const COFACTOR_INV: Fp = MontFp!("1");
}

pub type Vesta = Affine<VestaParameters>;
pub type ProjectiveVesta = Projective<VestaParameters>;

impl SWCurveConfig for VestaParameters {
    /// COEFF_A = 0
    const COEFF_A: Fq = MontFp!("0");

    /// COEFF_B = 5
    const COEFF_B: Fq = MontFp!("5");

    const GENERATOR: Vesta = Vesta::new_unchecked(G_GENERATOR_X, G_GENERATOR_Y);

    #[inline(always)]
    fn mul_by_a(_: Self::BaseField) -> Self::BaseField {
        Self::BaseField::zero()
    }
}
