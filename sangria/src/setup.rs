//! The setup phase: the shapes of both augmented circuits, their commitment
//! keys, the sponge parameters and the digest binding all of them.

use crate::{
    arithmetization::{CircuitBuilder, CircuitStructure},
    circuits::{
        AugmentedCircuit, AugmentedCircuitInputs, AugmentedCircuitParams, StepCircuit,
        TrivialCircuit,
    },
    curve::{CycleOfCurves, SangriaCurve},
    error::SangriaError,
    nifs::{FoldingProverKey, FoldingVerifierKey},
    Result, DECOMPOSITION_BITS, HASH_BITS,
};
use ark_ec::AffineRepr;
use ark_ff::{PrimeField, Zero};
use blake2::{Blake2b512, Digest};
use log::{debug, info};
use num_bigint::BigUint;
use num_integer::Integer;
use sangria_poly_commitment::{CommitmentCurve, SRS};
use sangria_poseidon::{
    constants::{PlonkSpongeConstants, SpongeConstants},
    pasta::{FP_TAG, FQ_TAG},
    poseidon::ArithmeticSpongeParams,
};
use sangria_utils::FieldHelpers;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// The tags every public parameter is derived from. Nothing else is random:
/// two setups with the same configuration and step circuit are equal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupConfig {
    /// Poseidon parameters over the field of the primary circuit
    pub poseidon_tag_primary: String,
    /// Poseidon parameters over the field of the secondary circuit
    pub poseidon_tag_secondary: String,
    pub srs_tag: String,
    /// Offset points of the in-circuit scalar multiplications
    pub offset_tag: String,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            poseidon_tag_primary: FQ_TAG.to_string(),
            poseidon_tag_secondary: FP_TAG.to_string(),
            srs_tag: sangria_poly_commitment::srs::DEFAULT_TAG.to_string(),
            offset_tag: "sangria/offset".to_string(),
        }
    }
}

pub struct PublicParams<C: CycleOfCurves> {
    pub config: SetupConfig,
    /// Number of elements of the state of the step circuit.
    pub arity: usize,
    pub sponge_params_primary: ArithmeticSpongeParams<C::F1>,
    pub sponge_params_secondary: ArithmeticSpongeParams<C::F2>,
    pub structure_primary: CircuitStructure<C::F1>,
    pub structure_secondary: CircuitStructure<C::F2>,
    pub ck_primary: SRS<C::E1>,
    pub ck_secondary: SRS<C::E2>,
    /// Used by the primary circuit, which adds points of `E2`
    pub offset_primary: C::E2,
    pub offset_secondary: C::E1,
    pub secondary_step: TrivialCircuit<C::F2>,
    digest: BigUint,
}

fn check_field<F: PrimeField>(name: &str) -> Result<()> {
    if F::MODULUS_BIT_SIZE as usize != DECOMPOSITION_BITS + 1 {
        return Err(SangriaError::UnsupportedCycle(format!(
            "the field of {name} has {} bits, expected {}",
            F::MODULUS_BIT_SIZE,
            DECOMPOSITION_BITS + 1
        )));
    }
    let alpha = BigUint::from(PlonkSpongeConstants::PERM_SBOX);
    if (F::modulus_biguint() - 1u32).gcd(&alpha) != BigUint::from(1u32) {
        return Err(SangriaError::UnsupportedCycle(format!(
            "the modulus of the field of {name} minus one should be coprime with {alpha}"
        )));
    }
    Ok(())
}

fn shape<F, G, SC>(circuit: &AugmentedCircuit<F, G, SC>, dummy: G, arity: usize) -> Result<CircuitStructure<F>>
where
    F: PrimeField,
    G: SangriaCurve<BaseField = F>,
    SC: StepCircuit<F>,
{
    let inputs = AugmentedCircuitInputs::base(F::zero(), vec![F::zero(); arity], dummy);
    let mut builder = CircuitBuilder::new();
    circuit.synthesize(&mut builder, &inputs)?;
    debug!(
        "Circuit over {} points: {} gates, {} variables, {} rows",
        G::NAME,
        builder.num_gates(),
        builder.num_variables(),
        builder.domain_size()
    );
    Ok(builder.to_structure())
}

impl<C: CycleOfCurves> PublicParams<C> {
    pub fn setup<SC: StepCircuit<C::F1>>(step_circuit: &SC, config: &SetupConfig) -> Result<Self> {
        let start = Instant::now();
        info!(
            "Setting up the public parameters for {} over {}/{}",
            SC::NAME,
            <C::E1 as SangriaCurve>::NAME,
            <C::E2 as SangriaCurve>::NAME
        );
        check_field::<C::F1>(<C::E1 as SangriaCurve>::NAME)?;
        check_field::<C::F2>(<C::E2 as SangriaCurve>::NAME)?;

        let sponge_params_primary =
            ArithmeticSpongeParams::generate::<PlonkSpongeConstants>(&config.poseidon_tag_primary);
        let sponge_params_secondary = ArithmeticSpongeParams::generate::<PlonkSpongeConstants>(
            &config.poseidon_tag_secondary,
        );
        let offset_primary =
            C::E2::hash_to_curve(format!("{}/primary", config.offset_tag).as_bytes());
        let offset_secondary =
            C::E1::hash_to_curve(format!("{}/secondary", config.offset_tag).as_bytes());
        let secondary_step = TrivialCircuit::new();

        let arity = step_circuit.arity();
        let structure_primary = {
            let circuit = AugmentedCircuit::new(
                AugmentedCircuitParams { is_primary: true },
                &sponge_params_primary,
                offset_primary,
                step_circuit,
            );
            shape(&circuit, C::E2::generator(), arity)?
        };
        let structure_secondary = {
            let circuit = AugmentedCircuit::new(
                AugmentedCircuitParams { is_primary: false },
                &sponge_params_secondary,
                offset_secondary,
                &secondary_step,
            );
            shape(&circuit, C::E1::generator(), secondary_step.arity())?
        };

        let ck_primary = SRS::create_with_tag(
            &format!("{}/primary", config.srs_tag),
            structure_primary.domain_size,
        );
        let ck_secondary = SRS::create_with_tag(
            &format!("{}/secondary", config.srs_tag),
            structure_secondary.domain_size,
        );

        let digest = {
            let bytes = rmp_serde::to_vec(&(config, &structure_primary, &structure_secondary))
                .map_err(|e| SangriaError::Serialization(e.to_string()))?;
            let hash = Blake2b512::digest(&bytes);
            let mask = (BigUint::from(1u32) << HASH_BITS) - 1u32;
            BigUint::from_bytes_le(&hash) & mask
        };

        info!(
            "Public parameters ready in {:?}: {} rows on the primary side, {} on the secondary side",
            start.elapsed(),
            structure_primary.domain_size,
            structure_secondary.domain_size
        );
        Ok(Self {
            config: config.clone(),
            arity,
            sponge_params_primary,
            sponge_params_secondary,
            structure_primary,
            structure_secondary,
            ck_primary,
            ck_secondary,
            offset_primary,
            offset_secondary,
            secondary_step,
            digest,
        })
    }

    /// The parameter digest, as absorbed by the primary circuit and the
    /// folds of secondary instances.
    pub fn digest_primary(&self) -> C::F1 {
        C::F1::from_le_bytes_mod_order(&self.digest.to_bytes_le())
    }

    pub fn digest_secondary(&self) -> C::F2 {
        C::F2::from_le_bytes_mod_order(&self.digest.to_bytes_le())
    }

    pub fn primary_circuit<'a, SC: StepCircuit<C::F1>>(
        &'a self,
        step_circuit: &'a SC,
    ) -> AugmentedCircuit<'a, C::F1, C::E2, SC> {
        AugmentedCircuit::new(
            AugmentedCircuitParams { is_primary: true },
            &self.sponge_params_primary,
            self.offset_primary,
            step_circuit,
        )
    }

    pub fn secondary_circuit(&self) -> AugmentedCircuit<'_, C::F2, C::E1, TrivialCircuit<C::F2>> {
        AugmentedCircuit::new(
            AugmentedCircuitParams { is_primary: false },
            &self.sponge_params_secondary,
            self.offset_secondary,
            &self.secondary_step,
        )
    }

    /// Folds primary instances. The transcript runs over the field of the
    /// secondary circuit, which verifies these folds.
    pub fn folding_key_primary(&self) -> FoldingProverKey<'_, C::F2, C::E1> {
        FoldingProverKey {
            structure: &self.structure_primary,
            ck: &self.ck_primary,
            verifier_key: FoldingVerifierKey {
                sponge_params: &self.sponge_params_secondary,
                pp_digest: self.digest_secondary(),
            },
        }
    }

    /// Folds secondary instances, verified by the primary circuit.
    pub fn folding_key_secondary(&self) -> FoldingProverKey<'_, C::F1, C::E2> {
        FoldingProverKey {
            structure: &self.structure_secondary,
            ck: &self.ck_secondary,
            verifier_key: FoldingVerifierKey {
                sponge_params: &self.sponge_params_primary,
                pp_digest: self.digest_primary(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        circuits::{CubicCircuit, FibonacciCircuit},
        curve::PastaCycle,
        transcript::fits_hash_bits,
    };
    use sangria_curves::pasta::{Fp, Fq};

    #[test]
    fn setup_is_deterministic_and_bound_to_the_step_circuit() {
        let config = SetupConfig::default();
        let pp = PublicParams::<PastaCycle>::setup(&CubicCircuit::<Fq>::new(), &config).unwrap();
        let again = PublicParams::<PastaCycle>::setup(&CubicCircuit::<Fq>::new(), &config).unwrap();
        assert_eq!(pp.digest_primary(), again.digest_primary());
        assert_eq!(pp.structure_primary, again.structure_primary);
        assert!(fits_hash_bits::<Fq>(&pp.digest_primary()));
        assert_eq!(
            pp.digest_primary().to_biguint(),
            pp.digest_secondary().to_biguint()
        );
        assert_eq!(pp.ck_primary.max_size(), pp.structure_primary.domain_size);
        assert_eq!(pp.ck_secondary.max_size(), pp.structure_secondary.domain_size);

        let fibonacci =
            PublicParams::<PastaCycle>::setup(&FibonacciCircuit::<Fq>::new(3), &config).unwrap();
        assert_eq!(fibonacci.arity, 2);
        assert_ne!(pp.digest_primary(), fibonacci.digest_primary());
        // the secondary side doesn't depend on the step circuit
        assert_eq!(pp.structure_secondary, fibonacci.structure_secondary);

        let other = SetupConfig {
            srs_tag: "another tag".to_string(),
            ..SetupConfig::default()
        };
        let other = PublicParams::<PastaCycle>::setup(&CubicCircuit::<Fq>::new(), &other).unwrap();
        assert_ne!(pp.digest_secondary(), other.digest_secondary());
        assert_ne!(other.digest_secondary(), Fp::zero());
    }
}
