//! Pedersen vector commitments.
//!
//! A commitment to `v` with blinding factor `ρ` is `Σ vᵢ·Gᵢ + ρ·H`. It is
//! deterministic in `(v, ρ)` and additively homomorphic, which is what the
//! folding scheme relies on.

use crate::{error::CommitmentError, srs::SRS};
use ark_ec::{
    short_weierstrass::{Affine, SWCurveConfig},
    AffineRepr, CurveGroup, VariableBaseMSM,
};
use ark_ff::{Field, PrimeField};
use blake2::{Blake2b512, Digest};
use sangria_poseidon::sponge::SpongeCurve;

/// Curves the commitment scheme works over.
pub trait CommitmentCurve: SpongeCurve {
    fn of_coordinates(x: Self::BaseField, y: Self::BaseField) -> Self;

    /// Deterministically map a base field element to a point, by trying
    /// `t, t + 1, t + 2, ...` as abscissa until one is on the curve.
    fn map_to_curve(t: Self::BaseField) -> Self;

    /// Hash arbitrary bytes to a point with BLAKE2b-512 and [Self::map_to_curve].
    /// Nobody knows the discrete logarithm of the result with respect to any
    /// other point derived this way.
    fn hash_to_curve(bytes: &[u8]) -> Self;
}

impl<P: SWCurveConfig> CommitmentCurve for Affine<P>
where
    P::BaseField: PrimeField,
{
    fn of_coordinates(x: P::BaseField, y: P::BaseField) -> Affine<P> {
        Affine::<P>::new_unchecked(x, y)
    }

    fn map_to_curve(t: P::BaseField) -> Affine<P> {
        let mut x = t;
        loop {
            if let Some(point) = Affine::<P>::get_point_from_x_unchecked(x, false) {
                let point = point.clear_cofactor();
                if !point.is_zero() {
                    return point;
                }
            }
            x += P::BaseField::ONE;
        }
    }

    fn hash_to_curve(bytes: &[u8]) -> Affine<P> {
        let mut hasher = Blake2b512::new();
        hasher.update(bytes);
        let t = P::BaseField::from_le_bytes_mod_order(&hasher.finalize());
        Self::map_to_curve(t)
    }
}

/// `r·c1 + c2`, the combination of commitments used when folding.
pub fn combine<G: AffineRepr>(c1: &G, c2: &G, r: G::ScalarField) -> G {
    (c1.into_group() * r + *c2).into_affine()
}

impl<G: CommitmentCurve> SRS<G> {
    /// `Σ vᵢ·Gᵢ`, without blinding.
    pub fn commit_non_hiding(&self, v: &[G::ScalarField]) -> Result<G::Group, CommitmentError> {
        if v.len() > self.g.len() {
            return Err(CommitmentError::VectorTooLong(v.len(), self.g.len()));
        }
        Ok(G::Group::msm_unchecked(&self.g[..v.len()], v))
    }

    /// Commit to `v` with the blinding factor `blinding`.
    pub fn commit(
        &self,
        v: &[G::ScalarField],
        blinding: G::ScalarField,
    ) -> Result<G, CommitmentError> {
        Ok((self.commit_non_hiding(v)? + self.h * blinding).into_affine())
    }

    /// Check that `commitment` opens to `v` with `blinding`.
    pub fn verify_opening(
        &self,
        commitment: &G,
        v: &[G::ScalarField],
        blinding: G::ScalarField,
    ) -> Result<(), CommitmentError> {
        let expected = self
            .commit(v, blinding)
            .map_err(|_| CommitmentError::OpeningMismatch)?;
        if expected == *commitment {
            Ok(())
        } else {
            Err(CommitmentError::OpeningMismatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{UniformRand, Zero};
    use sangria_curves::pasta::{Fp, Pallas, Vesta};
    use sangria_utils::tests::make_test_rng;

    #[test]
    fn hash_to_curve_is_deterministic() {
        let a = Vesta::hash_to_curve(b"sangria/test");
        let b = Vesta::hash_to_curve(b"sangria/test");
        let c = Vesta::hash_to_curve(b"sangria/other");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is_on_curve());
        assert!(a.is_in_correct_subgroup_assuming_on_curve());
    }

    #[test]
    fn coordinates_round_trip() {
        let p = Pallas::hash_to_curve(b"sangria/coords");
        let (x, y) = p.coordinates().unwrap();
        assert_eq!(Pallas::of_coordinates(x, y), p);
        assert!(Pallas::zero().coordinates().is_none());
    }

    #[test]
    fn combine_matches_scalar_multiplication() {
        let mut rng = make_test_rng(None);
        let c1 = Vesta::hash_to_curve(b"c1");
        let c2 = Vesta::hash_to_curve(b"c2");
        let r = Fp::rand(&mut rng);
        let expected = (c1 * r + c2).into_affine();
        assert_eq!(combine(&c1, &c2, r), expected);
        assert_eq!(combine(&c1, &c2, Fp::zero()), c2);
    }
}
