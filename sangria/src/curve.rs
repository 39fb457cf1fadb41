//! The curves of the cycle and the parameters the folding scheme needs from
//! them.
//!
//! Instances of the primary circuit are committed on `E1`, instances of the
//! secondary circuit on `E2`. The primary circuit runs over the scalar field
//! of `E1`, which is the base field of `E2`: it can manipulate commitments on
//! `E2` natively, and folds the secondary instances. The secondary circuit does
//! the same the other way around.

use ark_ec::short_weierstrass::{Affine, SWCurveConfig};
use ark_ff::PrimeField;
use sangria_curves::pasta::{Fp, Fq, PallasParameters, VestaParameters};
use sangria_poly_commitment::CommitmentCurve;

/// Represents additional information that a curve needs in order to be used
/// with Sangria.
pub trait SangriaCurve: CommitmentCurve {
    /// A human readable name.
    const NAME: &'static str;

    /// Return the coefficients `a` and `b` of the equation
    /// `y^2 = x^3 + a x + b` defining the curve.
    fn curve_params() -> (Self::BaseField, Self::BaseField);
}

impl SangriaCurve for Affine<PallasParameters> {
    const NAME: &'static str = "pallas";

    fn curve_params() -> (Self::BaseField, Self::BaseField) {
        (PallasParameters::COEFF_A, PallasParameters::COEFF_B)
    }
}

impl SangriaCurve for Affine<VestaParameters> {
    const NAME: &'static str = "vesta";

    fn curve_params() -> (Self::BaseField, Self::BaseField) {
        (VestaParameters::COEFF_A, VestaParameters::COEFF_B)
    }
}

/// A 2-cycle of curves: the scalar field of each curve is the base field of
/// the other one.
pub trait CycleOfCurves: Clone + Send + Sync + 'static {
    /// The field the primary circuit runs over.
    type F1: PrimeField;
    /// The field the secondary circuit runs over.
    type F2: PrimeField;
    /// Commits to primary instances.
    type E1: SangriaCurve<ScalarField = Self::F1, BaseField = Self::F2>;
    /// Commits to secondary instances.
    type E2: SangriaCurve<ScalarField = Self::F2, BaseField = Self::F1>;
}

/// Pallas commits to the primary instances, whose circuit runs over `Fq`;
/// Vesta commits to the secondary instances, whose circuit runs over `Fp`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PastaCycle;

impl CycleOfCurves for PastaCycle {
    type F1 = Fq;
    type F2 = Fp;
    type E1 = Affine<PallasParameters>;
    type E2 = Affine<VestaParameters>;
}
