//! Non-interactive folding of relaxed PLONK instances.
//!
//! The prover commits to the cross term `T` of the two pairs, derives the
//! challenge `r` from a transcript over the parameter digest, both instances
//! and the commitment to `T`, and combines instances and witnesses with `r`.
//! The only message is the commitment to `T`. The verifier re-derives `r`
//! and combines the instances.
//!
//! The transcript runs over the base field of the curve the instances are
//! committed on, which is the field of the circuit verifying the fold. The
//! encoding of the instances is described in [crate::transcript].

use crate::{
    arithmetization::{CircuitStructure, RelaxedInstance, RelaxedWitness},
    transcript::Transcript,
    Result,
};
use ark_ff::{PrimeField, UniformRand};
use log::debug;
use rand::{CryptoRng, RngCore};
use sangria_poly_commitment::{CommitmentCurve, SRS};
use sangria_poseidon::poseidon::ArithmeticSpongeParams;
use sangria_utils::serialization::SerdeAs;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Instant;

/// What the folding prover needs: the shape of the circuit, the commitment
/// key, and what the transcript is seeded with.
pub struct FoldingProverKey<'a, F: PrimeField, G: CommitmentCurve<BaseField = F>> {
    pub structure: &'a CircuitStructure<G::ScalarField>,
    pub ck: &'a SRS<G>,
    pub verifier_key: FoldingVerifierKey<'a, F>,
}

#[derive(Clone, Copy)]
pub struct FoldingVerifierKey<'a, F: PrimeField> {
    pub sponge_params: &'a ArithmeticSpongeParams<F>,
    pub pp_digest: F,
}

/// A folding proof: the commitment to the cross term.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "G: ark_serialize::CanonicalDeserialize + ark_serialize::CanonicalSerialize")]
pub struct NIFS<G: CommitmentCurve> {
    #[serde_as(as = "SerdeAs")]
    pub comm_t: G,
}

/// The folding challenge, over `pp, U1, U2, T` in this order.
pub fn folding_challenge<F: PrimeField, G: CommitmentCurve<BaseField = F>>(
    vk: &FoldingVerifierKey<F>,
    running: &RelaxedInstance<G>,
    incoming: &RelaxedInstance<G>,
    comm_t: &G,
) -> Result<G::ScalarField> {
    let mut transcript = Transcript::<F, G>::new(vk.sponge_params);
    transcript.absorb_fields(&[vk.pp_digest]);
    transcript.absorb_relaxed(running);
    transcript.absorb_relaxed(incoming);
    transcript.absorb_points(&[*comm_t]);
    transcript.challenge()
}

impl<G: CommitmentCurve> NIFS<G> {
    /// Fold `(incoming, incoming_witness)` into `(running, running_witness)`.
    /// The operands are left untouched.
    pub fn prove<F, R>(
        pk: &FoldingProverKey<F, G>,
        running: &RelaxedInstance<G>,
        running_witness: &RelaxedWitness<G::ScalarField>,
        incoming: &RelaxedInstance<G>,
        incoming_witness: &RelaxedWitness<G::ScalarField>,
        rng: &mut R,
    ) -> Result<(Self, (RelaxedInstance<G>, RelaxedWitness<G::ScalarField>))>
    where
        F: PrimeField,
        G: CommitmentCurve<BaseField = F>,
        R: RngCore + CryptoRng,
    {
        let start = Instant::now();
        let t = pk.structure.cross_term(
            running.u,
            &running.public_inputs,
            &running_witness.columns,
            incoming.u,
            &incoming.public_inputs,
            &incoming_witness.columns,
        )?;
        let t_blinder = G::ScalarField::rand(rng);
        let comm_t = pk.ck.commit(&t, t_blinder)?;

        let r = folding_challenge(&pk.verifier_key, running, incoming, &comm_t)?;

        let instance = running.fold(incoming, &comm_t, r);
        let witness = running_witness.fold(incoming_witness, &t, t_blinder, r);
        debug!(
            "Folded two instances of {} rows in {:?}",
            pk.structure.domain_size,
            start.elapsed()
        );
        Ok((NIFS { comm_t }, (instance, witness)))
    }

    /// The folded instance, as the prover computed it.
    pub fn verify<F>(
        &self,
        vk: &FoldingVerifierKey<F>,
        running: &RelaxedInstance<G>,
        incoming: &RelaxedInstance<G>,
    ) -> Result<RelaxedInstance<G>>
    where
        F: PrimeField,
        G: CommitmentCurve<BaseField = F>,
    {
        let r = folding_challenge(vk, running, incoming, &self.comm_t)?;
        Ok(running.fold(incoming, &self.comm_t, r))
    }
}

/// Fold two relaxed pairs, dropping the folding proof.
pub fn fold<F, G, R>(
    pk: &FoldingProverKey<F, G>,
    running: &RelaxedInstance<G>,
    running_witness: &RelaxedWitness<G::ScalarField>,
    incoming: &RelaxedInstance<G>,
    incoming_witness: &RelaxedWitness<G::ScalarField>,
    rng: &mut R,
) -> Result<(RelaxedInstance<G>, RelaxedWitness<G::ScalarField>)>
where
    F: PrimeField,
    G: CommitmentCurve<BaseField = F>,
    R: RngCore + CryptoRng,
{
    let (_, folded) = NIFS::prove(pk, running, running_witness, incoming, incoming_witness, rng)?;
    Ok(folded)
}
