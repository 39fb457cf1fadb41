//! Fiat-Shamir transcripts and the hash of the public IO.
//!
//! Everything a transcript absorbs is first encoded as elements of the base
//! field of the curve committing to the instances, which is the native field
//! of the circuit re-deriving the challenges. The encodings below are
//! mirrored gate by gate by the augmented circuit.

use crate::{arithmetization::RelaxedInstance, error::SangriaError, Result, HASH_BITS};
use ark_ff::{PrimeField, Zero};
use sangria_poly_commitment::CommitmentCurve;
use sangria_poseidon::{
    constants::PlonkSpongeConstants,
    poseidon::{ArithmeticSponge, ArithmeticSpongeParams, Sponge},
    sponge::DefaultFqSponge,
    FqSponge,
};
use sangria_utils::{field_helpers::split_128, FieldHelpers};

pub type BaseSponge<'a, G> = DefaultFqSponge<'a, G, PlonkSpongeConstants>;

/// `(x, y)`, or `(0, 0)` for the point at infinity.
pub fn point_to_fields<F: PrimeField, G: CommitmentCurve<BaseField = F>>(p: &G) -> [F; 2] {
    match p.coordinates() {
        Some((x, y)) => [x, y],
        None => [F::zero(), F::zero()],
    }
}

/// The integer value of a scalar, reduced in the base field. Used for the
/// relaxation factor `u`, which stays far below both moduli.
pub fn scalar_to_base<Src: PrimeField, Dst: PrimeField>(x: &Src) -> Dst {
    Dst::from_le_bytes_mod_order(&x.to_bytes())
}

/// The 13 base field elements a relaxed instance is absorbed as: the four
/// commitments, `u`, and each public input as two 128-bit halves.
pub fn relaxed_instance_to_fields<F: PrimeField, G: CommitmentCurve<BaseField = F>>(
    instance: &RelaxedInstance<G>,
) -> Vec<F> {
    let mut fields = Vec::with_capacity(8 + 1 + 2 * instance.public_inputs.len());
    for c in instance
        .commitments
        .iter()
        .chain(std::iter::once(&instance.error_commitment))
    {
        fields.extend(point_to_fields(c));
    }
    fields.push(scalar_to_base(&instance.u));
    for x in instance.public_inputs.iter() {
        let (lo, hi): (F, F) = split_128(x);
        fields.push(lo);
        fields.push(hi);
    }
    fields
}

/// A Fiat-Shamir transcript over the base field of `G`.
///
/// Squeezing before anything was absorbed is reported as
/// [SangriaError::TranscriptMisuse].
pub struct Transcript<'a, F: PrimeField, G: CommitmentCurve<BaseField = F>> {
    sponge: BaseSponge<'a, G>,
    absorbed: bool,
}

impl<'a, F: PrimeField, G: CommitmentCurve<BaseField = F>> Transcript<'a, F, G> {
    pub fn new(params: &'a ArithmeticSpongeParams<F>) -> Self {
        Self {
            sponge: BaseSponge::<G>::new(params),
            absorbed: false,
        }
    }

    pub fn absorb_fields(&mut self, xs: &[F]) {
        self.absorbed |= !xs.is_empty();
        self.sponge.absorb_fq(xs);
    }

    pub fn absorb_points(&mut self, points: &[G]) {
        self.absorbed |= !points.is_empty();
        self.sponge.absorb_g(points);
    }

    /// Scalars are absorbed as their low and high 128 bits.
    pub fn absorb_scalars(&mut self, xs: &[G::ScalarField]) {
        self.absorbed |= !xs.is_empty();
        self.sponge.absorb_fr(xs);
    }

    pub fn absorb_relaxed(&mut self, instance: &RelaxedInstance<G>) {
        self.absorb_fields(&relaxed_instance_to_fields(instance));
    }

    fn check_absorbed(&self) -> Result<()> {
        if self.absorbed {
            Ok(())
        } else {
            Err(SangriaError::TranscriptMisuse(
                "challenge squeezed from an empty transcript",
            ))
        }
    }

    /// A scalar challenge: the low 128 bits of a squeezed base field element.
    pub fn challenge(&mut self) -> Result<G::ScalarField> {
        self.check_absorbed()?;
        Ok(self.sponge.challenge())
    }

    /// A full base field challenge.
    pub fn challenge_base(&mut self) -> Result<F> {
        self.check_absorbed()?;
        Ok(self.sponge.challenge_fq())
    }

    /// Hand the sponge over, e.g. to the IPA, which continues the transcript.
    pub fn into_sponge(self) -> BaseSponge<'a, G> {
        self.sponge
    }
}

/// `H(pp, i, z_0, z_i, U)` truncated to [HASH_BITS] bits, the value the
/// augmented circuits forward to each other as public IO.
pub fn hash_public_io<F: PrimeField, G: CommitmentCurve<BaseField = F>>(
    params: &ArithmeticSpongeParams<F>,
    pp_digest: F,
    i: u64,
    z0: &[F],
    zi: &[F],
    running: &RelaxedInstance<G>,
) -> F {
    let mut sponge = ArithmeticSponge::<F, PlonkSpongeConstants>::new(params);
    sponge.absorb(&[pp_digest, F::from(i)]);
    sponge.absorb(z0);
    sponge.absorb(zi);
    sponge.absorb(&relaxed_instance_to_fields(running));
    sponge.squeeze().truncate_to_bits(HASH_BITS)
}

/// Whether `x` is a value an element of `F` can take once truncated to
/// [HASH_BITS] bits.
pub fn fits_hash_bits<F: PrimeField>(x: &F) -> bool {
    x.is_zero() || x.to_biguint().bits() as usize <= HASH_BITS
}
