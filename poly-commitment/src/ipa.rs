//! Inner product argument (IPA) openings of committed evaluation vectors, as
//! in [Efficient Zero-Knowledge Arguments for Arithmetic Circuits in the
//! Discrete Log Setting](https://eprint.iacr.org/2016/263), with the
//! Schnorr-style final round of Halo.
//!
//! The committed vectors are evaluations over a radix-2 domain, so the value of
//! the interpolated polynomial at `ζ` is the inner product of the vector with
//! the Lagrange coefficients `Lᵢ(ζ)`. Several vectors and several points are
//! batched with `polyscale` and `evalscale`.

use crate::{
    commitment::CommitmentCurve,
    error::CommitmentError,
    srs::SRS,
    utils::{b_poly_coefficients, combined_inner_product, inner_prod},
};
use ark_ec::{AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::{Field, One, UniformRand, Zero};
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain as D};
use log::trace;
use rand::{CryptoRng, RngCore};
use rayon::prelude::*;
use sangria_poseidon::FqSponge;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(bound = "G: ark_serialize::CanonicalDeserialize + ark_serialize::CanonicalSerialize")]
pub struct OpeningProof<G: AffineRepr> {
    /// Vector of rounds of L & R commitments
    #[serde_as(as = "Vec<(sangria_utils::serialization::SerdeAs, sangria_utils::serialization::SerdeAs)>")]
    pub lr: Vec<(G, G)>,
    #[serde_as(as = "sangria_utils::serialization::SerdeAs")]
    pub delta: G,
    #[serde_as(as = "sangria_utils::serialization::SerdeAs")]
    pub z1: G::ScalarField,
    #[serde_as(as = "sangria_utils::serialization::SerdeAs")]
    pub z2: G::ScalarField,
}

/// A commitment together with the claimed evaluations of the committed
/// vector at each of the evaluation points.
#[derive(Clone, Debug)]
pub struct Evaluation<G: AffineRepr> {
    pub commitment: G,
    pub evaluations: Vec<G::ScalarField>,
}

/// `b[k] = Σⱼ evalscale^j Lₖ(elm[j])`
fn combined_lagrange_coefficients<F: ark_ff::FftField>(
    domain: D<F>,
    elm: &[F],
    evalscale: F,
) -> Vec<F> {
    let mut res = vec![F::zero(); domain.size()];
    let mut scale = F::one();
    for e in elm {
        let coefficients = domain.evaluate_all_lagrange_coefficients(*e);
        res.par_iter_mut()
            .zip(coefficients.par_iter())
            .for_each(|(r, l)| *r += scale * l);
        scale *= evalscale;
    }
    res
}

fn fold_bases<G: AffineRepr>(g_lo: &[G], g_hi: &[G], u: G::ScalarField) -> Vec<G> {
    let folded: Vec<G::Group> = g_lo
        .par_iter()
        .zip(g_hi)
        .map(|(lo, hi)| *hi * u + *lo)
        .collect();
    G::Group::normalize_batch(&folded)
}

impl<G: CommitmentCurve> SRS<G> {
    /// Open a batch of vectors, given over `domain` together with their
    /// blinding factors, at the points `elm`.
    ///
    /// The sponge must already have absorbed everything the opening depends on
    /// (commitments and claimed evaluations).
    #[allow(clippy::too_many_arguments)]
    pub fn open<'a, EFqSponge, RNG>(
        &self,
        domain: D<G::ScalarField>,
        vectors: &[(&[G::ScalarField], G::ScalarField)],
        elm: &[G::ScalarField],
        polyscale: G::ScalarField,
        evalscale: G::ScalarField,
        mut sponge: EFqSponge,
        rng: &mut RNG,
    ) -> Result<OpeningProof<G>, CommitmentError>
    where
        EFqSponge: FqSponge<'a, G::BaseField, G, G::ScalarField>,
        RNG: RngCore + CryptoRng,
    {
        let n = domain.size();
        if n > self.g.len() {
            return Err(CommitmentError::DomainTooLarge(n, self.g.len()));
        }
        if let Some((v, _)) = vectors.iter().find(|(v, _)| v.len() > n) {
            return Err(CommitmentError::VectorTooLong(v.len(), n));
        }
        let rounds = domain.log_size_of_group as usize;

        // p := Σᵢ polyscale^i pᵢ, and the matching blinding factor
        let mut a = vec![G::ScalarField::zero(); n];
        let mut blinding_factor = G::ScalarField::zero();
        let mut scale = G::ScalarField::one();
        for (v, blinding) in vectors {
            a.par_iter_mut()
                .zip(v.par_iter())
                .for_each(|(acc, x)| *acc += scale * x);
            blinding_factor += scale * blinding;
            scale *= polyscale;
        }

        let mut b = combined_lagrange_coefficients(domain, elm, evalscale);
        let combined_inner_product = inner_prod(&a, &b);
        sponge.absorb_fr(&[combined_inner_product]);

        // Another generator U, independent of the key
        let u_base = G::map_to_curve(sponge.challenge_fq());

        let mut g = self.g[..n].to_vec();
        let mut lr = Vec::with_capacity(rounds);
        let mut blinders = Vec::with_capacity(rounds);
        let mut chals = Vec::with_capacity(rounds);
        let mut chal_invs = Vec::with_capacity(rounds);

        for _ in 0..rounds {
            let half = g.len() / 2;
            let (g_lo, g_hi) = (&g[0..half], &g[half..]);
            let (a_lo, a_hi) = (&a[0..half], &a[half..]);
            let (b_lo, b_hi) = (&b[0..half], &b[half..]);

            let rand_l = G::ScalarField::rand(rng);
            let rand_r = G::ScalarField::rand(rng);

            let l = G::Group::msm_unchecked(
                &[g_lo, &[self.h, u_base]].concat(),
                &[a_hi, &[rand_l, inner_prod(a_hi, b_lo)]].concat(),
            )
            .into_affine();
            let r = G::Group::msm_unchecked(
                &[g_hi, &[self.h, u_base]].concat(),
                &[a_lo, &[rand_r, inner_prod(a_lo, b_hi)]].concat(),
            )
            .into_affine();

            lr.push((l, r));
            blinders.push((rand_l, rand_r));

            sponge.absorb_g(&[l]);
            sponge.absorb_g(&[r]);

            let u = sponge.challenge();
            let u_inv = u.inverse().ok_or(CommitmentError::ZeroChallenge)?;
            chals.push(u);
            chal_invs.push(u_inv);

            // a' = a_lo + u⁻¹·a_hi
            a = a_hi
                .par_iter()
                .zip(a_lo)
                .map(|(&hi, &lo)| hi * u_inv + lo)
                .collect();
            // b' = b_lo + u·b_hi
            b = b_lo
                .par_iter()
                .zip(b_hi)
                .map(|(&lo, &hi)| hi * u + lo)
                .collect();
            g = fold_bases(g_lo, g_hi, u);
        }

        let (a0, b0, g0) = (a[0], b[0], g[0]);

        // r' := Σᵢ (rand_l[i]·u[i]⁻¹ + rand_r[i]·u[i]) + blinding_factor
        let r_prime = blinders
            .iter()
            .zip(chals.iter().zip(chal_invs.iter()))
            .map(|((rand_l, rand_r), (u, u_inv))| *rand_l * u_inv + *rand_r * u)
            .fold(blinding_factor, |acc, x| acc + x);

        let d = G::ScalarField::rand(rng);
        let r_delta = G::ScalarField::rand(rng);

        // delta = d·(G0 + b0·U) + r_delta·H
        let delta = ((g0.into_group() + u_base * b0) * d + self.h * r_delta).into_affine();

        sponge.absorb_g(&[delta]);
        let c = sponge.challenge();

        let z1 = a0 * c + d;
        let z2 = r_prime * c + r_delta;

        Ok(OpeningProof { lr, delta, z1, z2 })
    }

    /// Check an opening produced by [SRS::open]. The sponge must be in the
    /// same state as the prover's was. Any malformed proof yields `false`.
    #[allow(clippy::too_many_arguments)]
    pub fn verify<'a, EFqSponge>(
        &self,
        domain: D<G::ScalarField>,
        evaluations: &[Evaluation<G>],
        elm: &[G::ScalarField],
        polyscale: G::ScalarField,
        evalscale: G::ScalarField,
        proof: &OpeningProof<G>,
        mut sponge: EFqSponge,
    ) -> bool
    where
        EFqSponge: FqSponge<'a, G::BaseField, G, G::ScalarField>,
    {
        let n = domain.size();
        let rounds = domain.log_size_of_group as usize;
        if n > self.g.len() {
            trace!("IPA: domain of size {} larger than the key", n);
            return false;
        }
        if proof.lr.len() != rounds {
            trace!("IPA: expected {} rounds, got {}", rounds, proof.lr.len());
            return false;
        }
        if evaluations.iter().any(|e| e.evaluations.len() != elm.len()) {
            trace!("IPA: evaluations don't match the evaluation points");
            return false;
        }

        let evals: Vec<Vec<G::ScalarField>> =
            evaluations.iter().map(|e| e.evaluations.clone()).collect();
        let combined_inner_product = combined_inner_product(&evals, polyscale, evalscale);
        sponge.absorb_fr(&[combined_inner_product]);
        let u_base = G::map_to_curve(sponge.challenge_fq());

        let mut chals = Vec::with_capacity(rounds);
        let mut chal_invs = Vec::with_capacity(rounds);
        for (l, r) in proof.lr.iter() {
            sponge.absorb_g(&[*l]);
            sponge.absorb_g(&[*r]);
            let u = sponge.challenge();
            match u.inverse() {
                Some(u_inv) => {
                    chals.push(u);
                    chal_invs.push(u_inv);
                }
                None => return false,
            }
        }

        sponge.absorb_g(&[proof.delta]);
        let c = sponge.challenge();

        let b = combined_lagrange_coefficients(domain, elm, evalscale);
        let s = b_poly_coefficients(&chals);
        let b0 = inner_prod(&s, &b);
        let g0 = G::Group::msm_unchecked(&self.g[..n], &s);

        // P' = Σᵢ polyscale^i Cᵢ + v·U + Σⱼ (uⱼ⁻¹·Lⱼ + uⱼ·Rⱼ)
        let mut points: Vec<G> = Vec::with_capacity(evaluations.len() + 2 * rounds + 1);
        let mut scalars = Vec::with_capacity(points.capacity());
        let mut scale = G::ScalarField::one();
        for e in evaluations {
            points.push(e.commitment);
            scalars.push(scale);
            scale *= polyscale;
        }
        points.push(u_base);
        scalars.push(combined_inner_product);
        for ((l, r), (u, u_inv)) in proof.lr.iter().zip(chals.iter().zip(chal_invs.iter())) {
            points.push(*l);
            scalars.push(*u_inv);
            points.push(*r);
            scalars.push(*u);
        }
        let p_prime = G::Group::msm_unchecked(&points, &scalars);

        // c·P' + delta == z1·(G0 + b0·U) + z2·H
        let lhs = p_prime * c + proof.delta;
        let rhs = (g0 + u_base * b0) * proof.z1 + self.h * proof.z2;
        lhs == rhs
    }
}
