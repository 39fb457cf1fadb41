//! The IVC orchestrator: the accumulator of the incrementally verifiable
//! computation, and the uncompressed verifier.
//!
//! After `N` steps, a [RecursiveSnark] holds
//! - `r_U_primary`, the fold of the primary instances of steps `0..N`,
//! - `r_U_secondary`, the fold of the secondary instances of steps `0..N-1`,
//! - `l_u_secondary`, the secondary instance of step `N - 1`, whose public
//!   inputs are `H1(pp, N, z_0, z_N, r_U_secondary)` and
//!   `H2(pp, N, z_0, z_0, r_U_primary)`,
//!
//! with their witnesses. A step folds `l_u_secondary` into `r_U_secondary`
//! and proves the fold with the primary circuit, which also runs the step
//! function; the resulting primary instance is folded into `r_U_primary` and
//! the fold is proven by the secondary circuit.

use crate::{
    arithmetization::{
        is_sat_plain, is_sat_relaxed, relax, CircuitBuilder, CircuitStructure, PlainInstance,
        PlainWitness, RelaxedInstance, RelaxedWitness,
    },
    circuits::{AugmentedCircuit, AugmentedCircuitInputs, StepCircuit},
    curve::{CycleOfCurves, SangriaCurve},
    error::SangriaError,
    nifs::NIFS,
    setup::PublicParams,
    transcript::hash_public_io,
    Result, NUMBER_OF_PUBLIC_INPUTS,
};
use ark_ec::AffineRepr;
use ark_ff::{PrimeField, Zero};
use log::{debug, info};
use rand::{CryptoRng, RngCore};
use sangria_poly_commitment::{CommitmentCurve, SRS};
use sangria_poseidon::poseidon::ArithmeticSpongeParams;
use sangria_utils::FieldHelpers;
use std::time::Instant;

/// The state of the secondary side, `[0]` at every step.
pub(crate) fn initial_secondary_state<F: PrimeField>() -> Vec<F> {
    vec![F::zero()]
}

/// Synthesize an augmented circuit, check the resulting witness against the
/// shape of the public parameters and commit to it. Fails with
/// [SangriaError::UnsatisfiedRelation] before anything is committed.
#[allow(clippy::type_complexity)]
fn synthesize_step<F, G, H, SC, R>(
    circuit: &AugmentedCircuit<F, G, SC>,
    structure: &CircuitStructure<F>,
    ck: &SRS<H>,
    inputs: &AugmentedCircuitInputs<G>,
    rng: &mut R,
) -> Result<(PlainInstance<H>, PlainWitness<F>, Vec<F>)>
where
    F: PrimeField,
    G: SangriaCurve<BaseField = F>,
    H: CommitmentCurve<ScalarField = F>,
    SC: StepCircuit<F>,
    R: RngCore + CryptoRng,
{
    let mut builder = CircuitBuilder::new();
    let z_next = circuit.synthesize(&mut builder, inputs)?;
    let (x, columns) = builder.to_witness();
    structure.check_plain(&x, &columns)?;
    let witness = PlainWitness::new(columns, rng);
    let commitments = witness.commit(ck)?;
    Ok((PlainInstance::new(commitments, x), witness, z_next))
}

#[derive(Clone, Debug)]
pub struct RecursiveSnark<C: CycleOfCurves> {
    pub(crate) z0_primary: Vec<C::F1>,
    pub(crate) zi_primary: Vec<C::F1>,
    pub(crate) zi_secondary: Vec<C::F2>,

    pub(crate) r_u_primary: RelaxedInstance<C::E1>,
    pub(crate) r_w_primary: RelaxedWitness<C::F1>,
    pub(crate) r_u_secondary: RelaxedInstance<C::E2>,
    pub(crate) r_w_secondary: RelaxedWitness<C::F2>,
    pub(crate) l_u_secondary: PlainInstance<C::E2>,
    pub(crate) l_w_secondary: PlainWitness<C::F2>,

    pub(crate) num_steps: u64,
}

impl<C: CycleOfCurves> RecursiveSnark<C> {
    /// Run step 0 of the computation from `z0`.
    pub fn new<SC, R>(pp: &PublicParams<C>, step_circuit: &SC, z0: &[C::F1], rng: &mut R) -> Result<Self>
    where
        SC: StepCircuit<C::F1>,
        R: RngCore + CryptoRng,
    {
        let start = Instant::now();
        if z0.len() != pp.arity {
            return Err(SangriaError::Synthesis(format!(
                "the initial state has {} elements, expected {}",
                z0.len(),
                pp.arity
            )));
        }
        let z0_secondary = initial_secondary_state::<C::F2>();

        let (l_u_primary, l_w_primary, z1) = synthesize_step(
            &pp.primary_circuit(step_circuit),
            &pp.structure_primary,
            &pp.ck_primary,
            &AugmentedCircuitInputs::base(pp.digest_primary(), z0.to_vec(), C::E2::generator()),
            rng,
        )?;

        let secondary_inputs = AugmentedCircuitInputs {
            pp_digest: pp.digest_secondary(),
            i: 0,
            z0: z0_secondary.clone(),
            zi: z0_secondary,
            running: RelaxedInstance::default(NUMBER_OF_PUBLIC_INPUTS),
            incoming: l_u_primary.clone(),
            comm_t: C::E1::generator(),
        };
        let (l_u_secondary, l_w_secondary, zi_secondary) = synthesize_step(
            &pp.secondary_circuit(),
            &pp.structure_secondary,
            &pp.ck_secondary,
            &secondary_inputs,
            rng,
        )?;

        info!("Base case of {} proven in {:?}", SC::NAME, start.elapsed());
        Ok(Self {
            z0_primary: z0.to_vec(),
            zi_primary: z1,
            zi_secondary,
            r_u_primary: relax(&l_u_primary),
            r_w_primary: RelaxedWitness::from_plain(&l_w_primary),
            r_u_secondary: RelaxedInstance::default(NUMBER_OF_PUBLIC_INPUTS),
            r_w_secondary: RelaxedWitness::default(pp.structure_secondary.domain_size),
            l_u_secondary,
            l_w_secondary,
            num_steps: 1,
        })
    }

    /// Prove one more step. `self` is left untouched: on failure, it is still
    /// the accumulator of the steps proven so far.
    pub fn prove_step<SC, R>(&self, pp: &PublicParams<C>, step_circuit: &SC, rng: &mut R) -> Result<Self>
    where
        SC: StepCircuit<C::F1>,
        R: RngCore + CryptoRng,
    {
        let start = Instant::now();
        let i = self.num_steps;

        let (nifs_secondary, (r_u_secondary, r_w_secondary)) = NIFS::prove(
            &pp.folding_key_secondary(),
            &self.r_u_secondary,
            &self.r_w_secondary,
            &relax(&self.l_u_secondary),
            &RelaxedWitness::from_plain(&self.l_w_secondary),
            rng,
        )?;

        let primary_inputs = AugmentedCircuitInputs {
            pp_digest: pp.digest_primary(),
            i,
            z0: self.z0_primary.clone(),
            zi: self.zi_primary.clone(),
            running: self.r_u_secondary.clone(),
            incoming: self.l_u_secondary.clone(),
            comm_t: nifs_secondary.comm_t,
        };
        let (l_u_primary, l_w_primary, zi_primary) = synthesize_step(
            &pp.primary_circuit(step_circuit),
            &pp.structure_primary,
            &pp.ck_primary,
            &primary_inputs,
            rng,
        )
        .map_err(|e| {
            debug!("Primary circuit of step {i} rejected: {e}");
            e
        })?;

        let (nifs_primary, (r_u_primary, r_w_primary)) = NIFS::prove(
            &pp.folding_key_primary(),
            &self.r_u_primary,
            &self.r_w_primary,
            &relax(&l_u_primary),
            &RelaxedWitness::from_plain(&l_w_primary),
            rng,
        )?;

        let secondary_inputs = AugmentedCircuitInputs {
            pp_digest: pp.digest_secondary(),
            i,
            z0: initial_secondary_state(),
            zi: self.zi_secondary.clone(),
            running: self.r_u_primary.clone(),
            incoming: l_u_primary,
            comm_t: nifs_primary.comm_t,
        };
        let (l_u_secondary, l_w_secondary, zi_secondary) = synthesize_step(
            &pp.secondary_circuit(),
            &pp.structure_secondary,
            &pp.ck_secondary,
            &secondary_inputs,
            rng,
        )
        .map_err(|e| {
            debug!("Secondary circuit of step {i} rejected: {e}");
            e
        })?;

        info!("Step {} of {} proven in {:?}", i, SC::NAME, start.elapsed());
        Ok(Self {
            z0_primary: self.z0_primary.clone(),
            zi_primary,
            zi_secondary,
            r_u_primary,
            r_w_primary,
            r_u_secondary,
            r_w_secondary,
            l_u_secondary,
            l_w_secondary,
            num_steps: i + 1,
        })
    }

    pub fn num_steps(&self) -> u64 {
        self.num_steps
    }

    /// `z_N`
    pub fn outputs(&self) -> &[C::F1] {
        &self.zi_primary
    }

    /// Check that the accumulator proves `num_steps` steps from `z0`, and
    /// return `z_N`.
    pub fn verify(&self, pp: &PublicParams<C>, num_steps: u64, z0: &[C::F1]) -> Result<Vec<C::F1>> {
        let start = Instant::now();
        let fail = |reason: &str| Err(SangriaError::VerificationFailed(reason.to_string()));
        if num_steps == 0 || self.num_steps != num_steps {
            return fail("wrong number of steps");
        }
        if self.z0_primary != z0 {
            return fail("wrong initial state");
        }
        self.check_hashes(pp)?;

        let (primary, (secondary, latest)) = rayon::join(
            || {
                is_sat_relaxed(
                    &pp.structure_primary,
                    &pp.ck_primary,
                    &self.r_u_primary,
                    &self.r_w_primary,
                )
            },
            || {
                rayon::join(
                    || {
                        is_sat_relaxed(
                            &pp.structure_secondary,
                            &pp.ck_secondary,
                            &self.r_u_secondary,
                            &self.r_w_secondary,
                        )
                    },
                    || {
                        is_sat_plain(
                            &pp.structure_secondary,
                            &pp.ck_secondary,
                            &self.l_u_secondary,
                            &self.l_w_secondary,
                        )
                    },
                )
            },
        );
        primary
            .and(secondary)
            .and(latest)
            .map_err(|e| SangriaError::VerificationFailed(e.to_string()))?;

        debug!("Verified {} steps in {:?}", num_steps, start.elapsed());
        Ok(self.zi_primary.clone())
    }

    /// The public inputs of the latest secondary instance are the hashes of
    /// both running instances.
    pub(crate) fn check_hashes(&self, pp: &PublicParams<C>) -> Result<()> {
        check_hash_links(
            &HashKey::from(pp),
            self.num_steps,
            &self.z0_primary,
            &self.zi_primary,
            &self.zi_secondary,
            &self.r_u_primary,
            &self.r_u_secondary,
            &self.l_u_secondary,
        )
    }
}

/// What the hashes of the public IO are computed with.
pub(crate) struct HashKey<'a, C: CycleOfCurves> {
    pub sponge_params_primary: &'a ArithmeticSpongeParams<C::F1>,
    pub digest_primary: C::F1,
    pub sponge_params_secondary: &'a ArithmeticSpongeParams<C::F2>,
    pub digest_secondary: C::F2,
}

impl<'a, C: CycleOfCurves> From<&'a PublicParams<C>> for HashKey<'a, C> {
    fn from(pp: &'a PublicParams<C>) -> Self {
        Self {
            sponge_params_primary: &pp.sponge_params_primary,
            digest_primary: pp.digest_primary(),
            sponge_params_secondary: &pp.sponge_params_secondary,
            digest_secondary: pp.digest_secondary(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn check_hash_links<C: CycleOfCurves>(
    key: &HashKey<C>,
    num_steps: u64,
    z0_primary: &[C::F1],
    zn_primary: &[C::F1],
    zn_secondary: &[C::F2],
    r_u_primary: &RelaxedInstance<C::E1>,
    r_u_secondary: &RelaxedInstance<C::E2>,
    l_u_secondary: &PlainInstance<C::E2>,
) -> Result<()> {
    let well_formed = l_u_secondary.public_inputs.len() == NUMBER_OF_PUBLIC_INPUTS
        && r_u_primary.public_inputs.len() == NUMBER_OF_PUBLIC_INPUTS
        && r_u_secondary.public_inputs.len() == NUMBER_OF_PUBLIC_INPUTS
        && zn_primary.len() == z0_primary.len();
    if !well_formed {
        return Err(SangriaError::VerificationFailed(
            "malformed instances or states".to_string(),
        ));
    }
    // the secondary step is the identity on this state
    let z0_secondary = initial_secondary_state::<C::F2>();
    if zn_secondary != z0_secondary.as_slice() {
        return Err(SangriaError::VerificationFailed(
            "the secondary state is not the initial one".to_string(),
        ));
    }
    let h_primary = hash_public_io(
        key.sponge_params_primary,
        key.digest_primary,
        num_steps,
        z0_primary,
        zn_primary,
        r_u_secondary,
    );
    if h_primary.to_biguint() != l_u_secondary.public_inputs[0].to_biguint() {
        return Err(SangriaError::VerificationFailed(
            "the hash of the primary side doesn't match".to_string(),
        ));
    }
    let h_secondary = hash_public_io(
        key.sponge_params_secondary,
        key.digest_secondary,
        num_steps,
        &z0_secondary,
        zn_secondary,
        r_u_primary,
    );
    if h_secondary != l_u_secondary.public_inputs[1] {
        return Err(SangriaError::VerificationFailed(
            "the hash of the secondary side doesn't match".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        circuits::CubicCircuit,
        curve::PastaCycle,
        setup::SetupConfig,
    };
    use ark_ff::One;
    use sangria_curves::pasta::{Fp, Fq};
    use sangria_utils::tests::make_test_rng;

    #[test]
    fn two_steps_of_the_cubic_circuit() {
        let mut rng = make_test_rng(None);
        let step = CubicCircuit::<Fq>::new();
        let pp = PublicParams::<PastaCycle>::setup(&step, &SetupConfig::default()).unwrap();
        let z0 = vec![Fq::from(1u64)];

        let snark = RecursiveSnark::new(&pp, &step, &z0, &mut rng).unwrap();
        assert_eq!(snark.verify(&pp, 1, &z0).unwrap(), step.output(&z0));

        let next = snark.prove_step(&pp, &step, &mut rng).unwrap();
        let expected = step.output(&step.output(&z0));
        assert_eq!(next.verify(&pp, 2, &z0).unwrap(), expected);
        assert_eq!(next.outputs(), &expected[..]);

        assert!(matches!(
            next.verify(&pp, 3, &z0),
            Err(SangriaError::VerificationFailed(_))
        ));
        assert!(matches!(
            next.verify(&pp, 2, &[Fq::from(2u64)]),
            Err(SangriaError::VerificationFailed(_))
        ));
        // the previous accumulator is still valid
        assert!(snark.verify(&pp, 1, &z0).is_ok());

        let mut forged = next.clone();
        forged.zi_secondary = vec![Fp::one()];
        assert!(matches!(
            forged.verify(&pp, 2, &z0),
            Err(SangriaError::VerificationFailed(_))
        ));
    }
}
