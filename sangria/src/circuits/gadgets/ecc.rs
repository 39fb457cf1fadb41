//! Short Weierstrass arithmetic over the native field, for the curve whose
//! base field is the field of the circuit.
//!
//! Points carry a boolean flag for the point at infinity, which is then
//! represented with the coordinates `(0, 0)`, like in the transcripts. The
//! arithmetic itself is incomplete: the callers make sure the inputs of an
//! addition have distinct abscissas, and the incomplete operations are only
//! applied to points that are not the point at infinity.

use crate::{
    arithmetization::{CircuitBuilder, Selectors, Variable},
    curve::SangriaCurve,
};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{Field, PrimeField};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocatedPoint {
    pub x: Variable,
    pub y: Variable,
    pub is_infinity: Variable,
}

impl AllocatedPoint {
    fn raw_coordinates<F: PrimeField, G: SangriaCurve<BaseField = F>>(p: &G) -> (F, F, F) {
        match p.coordinates() {
            Some((x, y)) => (x, y, F::zero()),
            None => (F::zero(), F::zero(), F::one()),
        }
    }

    /// Allocate `p` as advice, constrained to be on the curve or to be the
    /// point at infinity.
    pub fn alloc<F: PrimeField, G: SangriaCurve<BaseField = F>>(
        builder: &mut CircuitBuilder<F>,
        p: &G,
    ) -> Self {
        let (x, y, inf) = Self::raw_coordinates(p);
        let point = Self {
            x: builder.alloc(x),
            y: builder.alloc(y),
            is_infinity: builder.alloc(inf),
        };
        point.check_on_curve::<F, G>(builder);
        point
    }

    /// Allocate `p` as advice, constrained to be on the curve.
    pub fn alloc_finite<F: PrimeField, G: SangriaCurve<BaseField = F>>(
        builder: &mut CircuitBuilder<F>,
        p: &G,
    ) -> Self {
        let point = Self::alloc(builder, p);
        let zero = builder.zero();
        builder.assert_equal(point.is_infinity, zero);
        point
    }

    pub fn constant<F: PrimeField, G: SangriaCurve<BaseField = F>>(
        builder: &mut CircuitBuilder<F>,
        p: &G,
    ) -> Self {
        let (x, y, inf) = Self::raw_coordinates(p);
        Self {
            x: builder.constant(x),
            y: builder.constant(y),
            is_infinity: builder.constant(inf),
        }
    }

    pub fn identity<F: PrimeField>(builder: &mut CircuitBuilder<F>) -> Self {
        let zero = builder.zero();
        Self {
            x: zero,
            y: zero,
            is_infinity: builder.one(),
        }
    }

    fn finite<F: PrimeField>(builder: &mut CircuitBuilder<F>, x: Variable, y: Variable) -> Self {
        Self {
            x,
            y,
            is_infinity: builder.zero(),
        }
    }

    /// The point held by the witness.
    pub fn value<F: PrimeField, G: SangriaCurve<BaseField = F>>(
        &self,
        builder: &CircuitBuilder<F>,
    ) -> G {
        if builder.value(self.is_infinity).is_one() {
            G::zero()
        } else {
            G::of_coordinates(builder.value(self.x), builder.value(self.y))
        }
    }

    /// The coordinates absorbed by transcripts: `(0, 0)` for infinity.
    pub fn to_fields(&self) -> [Variable; 2] {
        [self.x, self.y]
    }

    // is_infinity ∈ {0, 1}, is_infinity·x = is_infinity·y = 0 and
    // y² = x³ + a·x + b·(1 - is_infinity)
    fn check_on_curve<F: PrimeField, G: SangriaCurve<BaseField = F>>(
        &self,
        builder: &mut CircuitBuilder<F>,
    ) {
        let (a, b) = G::curve_params();
        builder.assert_boolean(self.is_infinity);
        for coordinate in [self.x, self.y] {
            builder.gate(
                [Some(self.is_infinity), Some(coordinate), None],
                Selectors {
                    q_m: F::one(),
                    ..Default::default()
                },
            );
        }
        let y2 = builder.mul(self.y, self.y);
        let x2 = builder.mul(self.x, self.x);
        let x3 = builder.mul(x2, self.x);
        let lhs = builder.linear_combination(
            &[
                (F::one(), y2),
                (-F::one(), x3),
                (-a, self.x),
                (b, self.is_infinity),
            ],
            -b,
        );
        let zero = builder.zero();
        builder.assert_equal(lhs, zero);
    }

    pub fn negate<F: PrimeField>(&self, builder: &mut CircuitBuilder<F>) -> Self {
        Self {
            x: self.x,
            y: builder.scale(self.y, -F::one()),
            is_infinity: self.is_infinity,
        }
    }

    /// `2·self`, for a finite point with `y ≠ 0`.
    pub fn double<F: PrimeField>(&self, builder: &mut CircuitBuilder<F>, a: F) -> Self {
        let x2 = builder.mul(self.x, self.x);
        let num = builder.linear_combination(&[(F::from(3u64), x2)], a);
        let den = builder.scale(self.y, F::from(2u64));
        let lambda = builder.div(num, den);
        self.finish_addition(builder, lambda, self)
    }

    /// `self + other`, for finite points with distinct abscissas.
    pub fn add_incomplete<F: PrimeField>(
        &self,
        builder: &mut CircuitBuilder<F>,
        other: &Self,
    ) -> Self {
        let dx = builder.sub(other.x, self.x);
        builder.assert_nonzero(dx);
        let dy = builder.sub(other.y, self.y);
        let lambda = builder.div(dy, dx);
        self.finish_addition(builder, lambda, other)
    }

    // x3 = λ² - x1 - x2, y3 = λ·(x1 - x3) - y1
    fn finish_addition<F: PrimeField>(
        &self,
        builder: &mut CircuitBuilder<F>,
        lambda: Variable,
        other: &Self,
    ) -> Self {
        let lambda2 = builder.mul(lambda, lambda);
        let x3 = builder.linear_combination(
            &[
                (F::one(), lambda2),
                (-F::one(), self.x),
                (-F::one(), other.x),
            ],
            F::zero(),
        );
        let dx = builder.sub(self.x, x3);
        let m = builder.mul(lambda, dx);
        let y3 = builder.sub(m, self.y);
        Self::finite(builder, x3, y3)
    }

    /// `t` if the boolean `cond` is set, `f` otherwise.
    pub fn select<F: PrimeField>(
        builder: &mut CircuitBuilder<F>,
        cond: Variable,
        t: &Self,
        f: &Self,
    ) -> Self {
        Self {
            x: builder.select(cond, t.x, f.x),
            y: builder.select(cond, t.y, f.y),
            is_infinity: builder.select(cond, t.is_infinity, f.is_infinity),
        }
    }

    /// `self + p` where `self` may be the point at infinity and `p` is
    /// finite, with an abscissa distinct from the one of `self`.
    pub fn add_to_finite<F: PrimeField>(&self, builder: &mut CircuitBuilder<F>, p: &Self) -> Self {
        let sum = self.add_incomplete(builder, p);
        let x = builder.select(self.is_infinity, p.x, sum.x);
        let y = builder.select(self.is_infinity, p.y, sum.y);
        Self::finite(builder, x, y)
    }

    /// `k·self` for the integer `k` given by its little-endian bits, with a
    /// double-and-add starting from the fixed point `offset`, which is
    /// removed at the end. `self` must be finite.
    pub fn scalar_mul<F: PrimeField, G: SangriaCurve<BaseField = F>>(
        &self,
        builder: &mut CircuitBuilder<F>,
        bits: &[Variable],
        offset: &G,
    ) -> Self {
        let (a, _) = G::curve_params();
        let mut acc = Self::constant(builder, offset);
        for bit in bits.iter().rev() {
            let doubled = acc.double(builder, a);
            let sum = doubled.add_incomplete(builder, self);
            acc = Self::select(builder, *bit, &sum, &doubled);
        }
        // acc = 2^n·offset + k·self
        let shift = G::ScalarField::from(2u64).pow([bits.len() as u64]);
        let correction = (-(*offset * shift)).into_affine();
        let correction = Self::constant(builder, &correction);
        acc.add_incomplete(builder, &correction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::gadgets::bits::to_bits;
    use ark_ff::{UniformRand, Zero};
    use sangria_curves::pasta::{Fp, Fq, Pallas, Vesta};
    use sangria_poly_commitment::CommitmentCurve;
    use sangria_utils::{tests::make_test_rng, FieldHelpers};

    fn is_satisfied<F: PrimeField>(builder: &CircuitBuilder<F>) -> bool {
        let (structure, x, columns) = builder.finalize();
        structure.check_plain(&x, &columns).is_ok()
    }

    fn random_point<G: SangriaCurve>(rng: &mut impl rand::Rng) -> G {
        (G::generator() * G::ScalarField::rand(rng)).into_affine()
    }

    #[test]
    fn addition_and_doubling() {
        let mut rng = make_test_rng(None);
        let mut builder = CircuitBuilder::<Fq>::new();
        let p: Vesta = random_point(&mut rng);
        let q: Vesta = random_point(&mut rng);
        let vp = AllocatedPoint::alloc_finite(&mut builder, &p);
        let vq = AllocatedPoint::alloc_finite(&mut builder, &q);
        let sum = vp.add_incomplete(&mut builder, &vq);
        let doubled = vp.double(&mut builder, Fq::zero());
        let neg = vp.negate(&mut builder);
        assert_eq!(sum.value::<Fq, Vesta>(&builder), (p + q).into_affine());
        assert_eq!(doubled.value::<Fq, Vesta>(&builder), (p + p).into_affine());
        assert_eq!(neg.value::<Fq, Vesta>(&builder), -p);
        assert!(is_satisfied(&builder));
    }

    #[test]
    fn points_off_the_curve_are_rejected() {
        let mut builder = CircuitBuilder::<Fp>::new();
        let p = Pallas::of_coordinates(Fp::from(1u64), Fp::from(1u64));
        let _ = AllocatedPoint::alloc(&mut builder, &p);
        assert!(!is_satisfied(&builder));

        let mut builder = CircuitBuilder::<Fp>::new();
        let identity = AllocatedPoint::alloc(&mut builder, &Pallas::zero());
        assert_eq!(identity.value::<Fp, Pallas>(&builder), Pallas::zero());
        assert!(is_satisfied(&builder));
    }

    #[test]
    fn adding_a_point_to_itself_is_rejected() {
        let mut rng = make_test_rng(None);
        let mut builder = CircuitBuilder::<Fq>::new();
        let p: Vesta = random_point(&mut rng);
        let vp = AllocatedPoint::alloc_finite(&mut builder, &p);
        let _ = vp.add_incomplete(&mut builder, &vp);
        assert!(!is_satisfied(&builder));
    }

    #[test]
    fn scalar_multiplication_by_128_bits() {
        let mut rng = make_test_rng(None);
        let mut builder = CircuitBuilder::<Fp>::new();
        let p: Pallas = random_point(&mut rng);
        let k = Fq::rand(&mut rng).truncate_to_bits(128);
        let offset = Pallas::hash_to_curve(b"sangria/test/offset");

        let vp = AllocatedPoint::alloc_finite(&mut builder, &p);
        let k_native: Fp = sangria_utils::field_helpers::embed(&k).unwrap();
        let vk = builder.alloc(k_native);
        let bits = to_bits(&mut builder, vk, 128);
        let res = vp.scalar_mul(&mut builder, &bits, &offset);
        assert_eq!(res.value::<Fp, Pallas>(&builder), (p * k).into_affine());

        let identity = AllocatedPoint::identity(&mut builder);
        let sum = identity.add_to_finite(&mut builder, &res);
        assert_eq!(sum.value::<Fp, Pallas>(&builder), (p * k).into_affine());
        let sum = vp.add_to_finite(&mut builder, &res);
        assert_eq!(sum.value::<Fp, Pallas>(&builder), (p * k + p).into_affine());
        assert!(is_satisfied(&builder));
    }
}
