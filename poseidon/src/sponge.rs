use crate::{
    constants::SpongeConstants,
    poseidon::{ArithmeticSponge, ArithmeticSpongeParams, Sponge},
};
use ark_ec::{
    models::short_weierstrass::{Affine, SWCurveConfig},
    AffineRepr,
};
use ark_ff::{BigInteger, Field, PrimeField, Zero};
use sangria_utils::{field_helpers::split_128, FieldHelpers};

/// Number of bits of a scalar challenge. Challenges are sampled as the low
/// 128 bits of a squeezed base field element, so the same integer is a valid
/// element of both fields of the cycle.
pub const CHALLENGE_BITS: usize = 128;

/// Abstracts a sponge operating on a base field `Fq` of the curve
/// `G`. The parameter `Fr` is modelling the scalar field of the
/// curve.
pub trait FqSponge<'a, Fq: Field, G, Fr> {
    /// Creates a new sponge.
    fn new(p: &'a ArithmeticSpongeParams<Fq>) -> Self;

    /// Absorbs a base field element. This operation is the most
    /// straightforward and calls the underlying sponge directly.
    fn absorb_fq(&mut self, x: &[Fq]);

    /// Absorbs a base field point, that is a pair of `Fq` elements.
    /// In the case of the point to infinity, the values `(0, 0)` are absorbed.
    fn absorb_g(&mut self, g: &[G]);

    /// Absorbs an element of the scalar field `Fr`, as its low 128 bits
    /// followed by its remaining high bits, both as base field elements.
    fn absorb_fr(&mut self, x: &[Fr]);

    /// Squeeze out a base field challenge. This operation is the most
    /// direct and calls the underlying sponge.
    fn challenge_fq(&mut self) -> Fq;

    /// Squeeze out a challenge in the scalar field: the low
    /// [CHALLENGE_BITS] bits of a squeezed base field element.
    fn challenge(&mut self) -> Fr;

    /// Returns a base field digest by squeezing the underlying sponge directly.
    fn digest_fq(self) -> Fq;

    /// Returns a scalar field digest, keeping as many low bits of a squeezed
    /// base field element as fit in the scalar field.
    fn digest(self) -> Fr;
}

/// Points whose affine coordinates can be absorbed by a sponge over the base
/// field.
pub trait SpongeCurve: AffineRepr {
    /// `None` for the point at infinity.
    fn coordinates(&self) -> Option<(Self::BaseField, Self::BaseField)>;
}

impl<P: SWCurveConfig> SpongeCurve for Affine<P> {
    fn coordinates(&self) -> Option<(P::BaseField, P::BaseField)> {
        if self.infinity {
            None
        } else {
            Some((self.x, self.y))
        }
    }
}

#[derive(Clone, Debug)]
pub struct DefaultFqSponge<'a, G: SpongeCurve, SC: SpongeConstants> {
    pub sponge: ArithmeticSponge<'a, G::BaseField, SC>,
}

/// Keep the low `bits` bits of `x` and reinterpret them in `Dst`.
pub fn truncate_into<Src: PrimeField, Dst: PrimeField>(x: &Src, bits: usize) -> Dst {
    Dst::from_le_bytes_mod_order(&x.truncate_to_bits(bits).into_bigint().to_bytes_le())
}

impl<'a, G: SpongeCurve, SC: SpongeConstants> FqSponge<'a, G::BaseField, G, G::ScalarField>
    for DefaultFqSponge<'a, G, SC>
where
    G::BaseField: PrimeField,
{
    fn new(params: &'a ArithmeticSpongeParams<G::BaseField>) -> Self {
        DefaultFqSponge {
            sponge: ArithmeticSponge::new(params),
        }
    }

    fn absorb_fq(&mut self, x: &[G::BaseField]) {
        self.sponge.absorb(x);
    }

    fn absorb_g(&mut self, g: &[G]) {
        for g in g.iter() {
            match g.coordinates() {
                Some((x, y)) => self.sponge.absorb(&[x, y]),
                None => self
                    .sponge
                    .absorb(&[G::BaseField::zero(), G::BaseField::zero()]),
            }
        }
    }

    fn absorb_fr(&mut self, x: &[G::ScalarField]) {
        x.iter().for_each(|x| {
            let (lo, hi): (G::BaseField, G::BaseField) = split_128(x);
            self.sponge.absorb(&[lo, hi]);
        });
    }

    fn challenge_fq(&mut self) -> G::BaseField {
        self.sponge.squeeze()
    }

    fn challenge(&mut self) -> G::ScalarField {
        let squeezed = self.sponge.squeeze();
        truncate_into(&squeezed, CHALLENGE_BITS)
    }

    fn digest_fq(mut self) -> G::BaseField {
        self.sponge.squeeze()
    }

    fn digest(mut self) -> G::ScalarField {
        let squeezed = self.sponge.squeeze();
        let bits = G::ScalarField::MODULUS_BIT_SIZE as usize - 1;
        truncate_into(&squeezed, bits)
    }
}
