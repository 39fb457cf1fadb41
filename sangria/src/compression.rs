//! Compression of a [RecursiveSnark] into a succinct proof.
//!
//! The latest secondary instance is folded into the secondary running
//! instance, and both running instances are proven with the decider. The
//! verifier replays the fold, checks the hashes the latest secondary instance
//! carries and both decider proofs.

use crate::{
    arithmetization::{relax, PlainInstance, RelaxedInstance, RelaxedWitness},
    curve::CycleOfCurves,
    decider::{prover, verifier, DeciderProof, DeciderProverKey, DeciderVerifierKey},
    error::SangriaError,
    ivc::{check_hash_links, HashKey, RecursiveSnark},
    nifs::{FoldingVerifierKey, NIFS},
    setup::PublicParams,
    Result,
};
use log::{debug, info};
use rand::{CryptoRng, RngCore};
use sangria_poseidon::poseidon::ArithmeticSpongeParams;
use sangria_utils::serialization::SerdeAs;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Instant;

pub struct ProverKey<C: CycleOfCurves> {
    pub primary: DeciderProverKey<C::E1>,
    pub secondary: DeciderProverKey<C::E2>,
}

#[derive(Clone, Debug)]
pub struct VerifierKey<C: CycleOfCurves> {
    pub arity: usize,
    pub sponge_params_primary: ArithmeticSpongeParams<C::F1>,
    pub sponge_params_secondary: ArithmeticSpongeParams<C::F2>,
    pub digest_primary: C::F1,
    pub digest_secondary: C::F2,
    pub primary: DeciderVerifierKey<C::E1>,
    pub secondary: DeciderVerifierKey<C::E2>,
}

impl<'a, C: CycleOfCurves> From<&'a VerifierKey<C>> for HashKey<'a, C> {
    fn from(vk: &'a VerifierKey<C>) -> Self {
        Self {
            sponge_params_primary: &vk.sponge_params_primary,
            digest_primary: vk.digest_primary,
            sponge_params_secondary: &vk.sponge_params_secondary,
            digest_secondary: vk.digest_secondary,
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CompressedSnark<C: CycleOfCurves> {
    r_u_primary: RelaxedInstance<C::E1>,
    /// Before the fold of `l_u_secondary`
    r_u_secondary: RelaxedInstance<C::E2>,
    l_u_secondary: PlainInstance<C::E2>,
    nifs_secondary: NIFS<C::E2>,

    proof_primary: DeciderProof<C::E1>,
    proof_secondary: DeciderProof<C::E2>,

    #[serde_as(as = "Vec<SerdeAs>")]
    zn_primary: Vec<C::F1>,
    #[serde_as(as = "Vec<SerdeAs>")]
    zn_secondary: Vec<C::F2>,
}

impl<C: CycleOfCurves> CompressedSnark<C> {
    /// The decider keys of both circuits.
    pub fn setup(pp: &PublicParams<C>) -> Result<(ProverKey<C>, VerifierKey<C>)> {
        let start = Instant::now();
        let primary = DeciderProverKey::setup(&pp.structure_primary, &pp.ck_primary)?;
        let secondary = DeciderProverKey::setup(&pp.structure_secondary, &pp.ck_secondary)?;
        let vk = VerifierKey {
            arity: pp.arity,
            sponge_params_primary: pp.sponge_params_primary.clone(),
            sponge_params_secondary: pp.sponge_params_secondary.clone(),
            digest_primary: pp.digest_primary(),
            digest_secondary: pp.digest_secondary(),
            primary: primary.vk.clone(),
            secondary: secondary.vk.clone(),
        };
        info!("Compression keys created in {:?}", start.elapsed());
        Ok((ProverKey { primary, secondary }, vk))
    }

    pub fn prove<R: RngCore + CryptoRng>(
        pp: &PublicParams<C>,
        pk: &ProverKey<C>,
        snark: &RecursiveSnark<C>,
        rng: &mut R,
    ) -> Result<Self> {
        let start = Instant::now();
        let (nifs_secondary, (f_u_secondary, f_w_secondary)) = NIFS::prove(
            &pp.folding_key_secondary(),
            &snark.r_u_secondary,
            &snark.r_w_secondary,
            &relax(&snark.l_u_secondary),
            &RelaxedWitness::from_plain(&snark.l_w_secondary),
            rng,
        )?;

        // Instances committed on E1 are absorbed over F2, and conversely
        let proof_primary = prover::prove(
            &pk.primary,
            &pp.sponge_params_secondary,
            &snark.r_u_primary,
            &snark.r_w_primary,
            rng,
        )?;
        let proof_secondary = prover::prove(
            &pk.secondary,
            &pp.sponge_params_primary,
            &f_u_secondary,
            &f_w_secondary,
            rng,
        )?;

        info!(
            "Compressed {} steps in {:?}",
            snark.num_steps,
            start.elapsed()
        );
        Ok(Self {
            r_u_primary: snark.r_u_primary.clone(),
            r_u_secondary: snark.r_u_secondary.clone(),
            l_u_secondary: snark.l_u_secondary.clone(),
            nifs_secondary,
            proof_primary,
            proof_secondary,
            zn_primary: snark.zi_primary.clone(),
            zn_secondary: snark.zi_secondary.clone(),
        })
    }

    /// Check that the proof attests `num_steps` steps from `z0`, and return
    /// `z_N`.
    pub fn verify(&self, vk: &VerifierKey<C>, num_steps: u64, z0: &[C::F1]) -> Result<Vec<C::F1>> {
        let start = Instant::now();
        if num_steps == 0 {
            return Err(SangriaError::VerificationFailed(
                "at least one step is proven".to_string(),
            ));
        }
        if z0.len() != vk.arity {
            return Err(SangriaError::VerificationFailed(
                "wrong arity of the initial state".to_string(),
            ));
        }
        check_hash_links(
            &HashKey::from(vk),
            num_steps,
            z0,
            &self.zn_primary,
            &self.zn_secondary,
            &self.r_u_primary,
            &self.r_u_secondary,
            &self.l_u_secondary,
        )?;

        let folding_key = FoldingVerifierKey {
            sponge_params: &vk.sponge_params_primary,
            pp_digest: vk.digest_primary,
        };
        let f_u_secondary = self
            .nifs_secondary
            .verify(&folding_key, &self.r_u_secondary, &relax(&self.l_u_secondary))
            .map_err(|e| SangriaError::VerificationFailed(e.to_string()))?;

        let (primary, secondary) = rayon::join(
            || {
                verifier::verify(
                    &vk.primary,
                    &vk.sponge_params_secondary,
                    &self.r_u_primary,
                    &self.proof_primary,
                )
            },
            || {
                verifier::verify(
                    &vk.secondary,
                    &vk.sponge_params_primary,
                    &f_u_secondary,
                    &self.proof_secondary,
                )
            },
        );
        if !primary {
            return Err(SangriaError::VerificationFailed(
                "invalid decider proof for the primary instance".to_string(),
            ));
        }
        if !secondary {
            return Err(SangriaError::VerificationFailed(
                "invalid decider proof for the secondary instance".to_string(),
            ));
        }
        debug!("Compressed proof of {} steps verified in {:?}", num_steps, start.elapsed());
        Ok(self.zn_primary.clone())
    }

    pub fn is_valid(&self, vk: &VerifierKey<C>, num_steps: u64, z0: &[C::F1]) -> bool {
        self.verify(vk, num_steps, z0).is_ok()
    }

    /// `z_N`, as claimed by the proof.
    pub fn outputs(&self) -> &[C::F1] {
        &self.zn_primary
    }
}
