//! The decider: a PLONK proof that a relaxed instance is satisfied, with
//! the inner product argument as polynomial commitment.
//!
//! The committed vectors of a relaxed instance are evaluations over a
//! domain `H` of size `N`, so the instance commitments are used as they are.
//! Every other polynomial (selectors, copy permutation, grand product,
//! quotient chunks) is also committed in evaluation form, without blinding:
//! the proof is succinct but not zero-knowledge.
//!
//! The prover convinces the verifier that, on `H`,
//! ```text
//! qM·a·b + u·(qL·a + qR·b + qO·c + PI) + u²·qC + E = 0
//! ```
//! and that the columns respect the copy permutation, with the grand product
//! argument of PLONK. The quotient by `Z_H` is computed over a coset of size
//! `4N` and committed in three chunks of size `N`.

pub mod proof;
pub mod prover;
pub mod verifier;

pub use proof::DeciderProof;

use crate::{arithmetization::CircuitStructure, error::SangriaError, Result, NUMBER_OF_COLUMNS};
use ark_ff::{Field, PrimeField, Zero};
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain as D};
use ark_serialize::CanonicalSerialize;
use blake2::{Blake2b512, Digest};
use log::debug;
use rayon::prelude::*;
use sangria_poly_commitment::{CommitmentCurve, SRS};
use std::time::Instant;

/// Number of polynomials opened by a decider proof, in this order: the
/// three columns, `E`, `z`, the five selectors, the three `σ`'s and the three
/// chunks of the quotient.
pub const NUMBER_OF_POLYNOMIALS: usize = 16;

/// Number of chunks of size `N` of the quotient.
pub const QUOTIENT_CHUNKS: usize = 3;

/// The shifts `k = (1, g, g²)` of the copy permutation, `g` being the
/// multiplicative generator of the field. The cosets `kⱼ·H` are disjoint.
pub fn shifts<F: PrimeField>() -> [F; NUMBER_OF_COLUMNS] {
    [F::one(), F::GENERATOR, F::GENERATOR.square()]
}

pub(crate) fn domain<F: PrimeField>(size: usize) -> Result<D<F>> {
    D::<F>::new(size)
        .filter(|d| d.size() == size)
        .ok_or_else(|| SangriaError::Synthesis(format!("no evaluation domain of size {size}")))
}

#[derive(Clone, Debug)]
pub struct DeciderVerifierKey<G: CommitmentCurve> {
    pub domain_size: usize,
    pub num_public: usize,
    /// `[qL, qR, qO, qM, qC]`
    pub selector_commitments: [G; 5],
    pub sigma_commitments: [G; NUMBER_OF_COLUMNS],
    /// Hash of everything above, the first element absorbed by the
    /// transcript.
    pub digest: G::BaseField,
    pub ck: SRS<G>,
}

#[derive(Clone, Debug)]
pub struct DeciderProverKey<G: CommitmentCurve> {
    pub structure: CircuitStructure<G::ScalarField>,
    /// `σⱼ(ωⁱ) = k_c·ω^r` where `(c, r)` is the cell the permutation sends
    /// `(j, i)` to.
    pub sigma: [Vec<G::ScalarField>; NUMBER_OF_COLUMNS],
    pub vk: DeciderVerifierKey<G>,
}

impl<G: CommitmentCurve> DeciderProverKey<G>
where
    G::BaseField: PrimeField,
{
    pub fn setup(structure: &CircuitStructure<G::ScalarField>, ck: &SRS<G>) -> Result<Self> {
        let start = Instant::now();
        let n = structure.domain_size;
        let d1 = domain::<G::ScalarField>(n)?;
        let k = shifts::<G::ScalarField>();
        let omegas: Vec<G::ScalarField> = d1.elements().collect();

        let sigma: [Vec<G::ScalarField>; NUMBER_OF_COLUMNS] = std::array::from_fn(|column| {
            (0..n)
                .into_par_iter()
                .map(|row| {
                    let cell = structure.sigma_of(column, row);
                    k[cell / n] * omegas[cell % n]
                })
                .collect()
        });

        let zero = G::ScalarField::zero();
        let selectors = structure.selectors();
        let mut selector_commitments = [G::zero(); 5];
        for (c, q) in selector_commitments.iter_mut().zip(selectors.iter()) {
            *c = ck.commit(q, zero)?;
        }
        let mut sigma_commitments = [G::zero(); NUMBER_OF_COLUMNS];
        for (c, s) in sigma_commitments.iter_mut().zip(sigma.iter()) {
            *c = ck.commit(s, zero)?;
        }

        let digest = {
            let mut bytes = vec![];
            let serialized = (n as u64)
                .serialize_compressed(&mut bytes)
                .and((structure.num_public as u64).serialize_compressed(&mut bytes))
                .and(selector_commitments.serialize_compressed(&mut bytes))
                .and(sigma_commitments.serialize_compressed(&mut bytes));
            serialized.map_err(|e| SangriaError::Serialization(e.to_string()))?;
            G::BaseField::from_le_bytes_mod_order(&Blake2b512::digest(&bytes))
        };

        debug!("Decider key over {n} rows created in {:?}", start.elapsed());
        Ok(Self {
            structure: structure.clone(),
            sigma,
            vk: DeciderVerifierKey {
                domain_size: n,
                num_public: structure.num_public,
                selector_commitments,
                sigma_commitments,
                digest,
                ck: ck.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arithmetization::{
        relax, CircuitBuilder, PlainInstance, PlainWitness, RelaxedInstance, RelaxedWitness,
    };
    use crate::nifs::{FoldingProverKey, FoldingVerifierKey, NIFS};
    use ark_ff::One;
    use sangria_curves::pasta::{Fp, Fq, Pallas};
    use sangria_poseidon::pasta::fp_params;
    use sangria_utils::tests::make_test_rng;

    // y = x^3 + x + 5, with x and y public
    fn cubic(x: u64) -> CircuitBuilder<Fq> {
        let mut builder = CircuitBuilder::new();
        let x = builder.alloc(Fq::from(x));
        let x2 = builder.mul(x, x);
        let x3 = builder.mul(x2, x);
        let y = builder.linear_combination(&[(Fq::one(), x3), (Fq::one(), x)], Fq::from(5u64));
        builder.public_input(x);
        builder.public_input(y);
        builder
    }

    #[test]
    fn decider_proof_of_a_folded_instance() {
        let mut rng = make_test_rng(None);
        let params = fp_params();
        let (structure, _, _) = cubic(0).finalize();
        let ck = SRS::<Pallas>::create(structure.domain_size);

        let mut fresh = |x: u64| {
            let (_, public, columns) = cubic(x).finalize();
            let witness = PlainWitness::new(columns, &mut rng);
            let instance = PlainInstance::new(witness.commit(&ck).unwrap(), public);
            (relax(&instance), RelaxedWitness::from_plain(&witness))
        };
        let (u1, w1) = fresh(3);
        let (u2, w2) = fresh(7);
        let folding_key = FoldingProverKey {
            structure: &structure,
            ck: &ck,
            verifier_key: FoldingVerifierKey {
                sponge_params: &params,
                pp_digest: Fp::from(42u64),
            },
        };
        let (_, (instance, witness)) =
            NIFS::prove(&folding_key, &u1, &w1, &u2, &w2, &mut rng).unwrap();

        let pk = DeciderProverKey::setup(&structure, &ck).unwrap();
        let proof = prover::prove(&pk, &params, &instance, &witness, &mut rng).unwrap();
        assert!(verifier::verify(&pk.vk, &params, &instance, &proof));

        // the proof is bound to the instance
        let other: RelaxedInstance<Pallas> = RelaxedInstance {
            u: instance.u + Fq::one(),
            ..instance.clone()
        };
        assert!(!verifier::verify(&pk.vk, &params, &other, &proof));

        let mut tampered = proof.clone();
        tampered.evals_zeta[0] += Fq::one();
        assert!(!verifier::verify(&pk.vk, &params, &instance, &tampered));

        let mut truncated = proof.clone();
        truncated.evals_zeta.pop();
        assert!(!verifier::verify(&pk.vk, &params, &instance, &truncated));

        let mut swapped = proof;
        swapped.t_commitments.swap(0, 1);
        assert!(!verifier::verify(&pk.vk, &params, &instance, &swapped));
    }

    #[test]
    fn unsatisfied_pairs_are_not_proven() {
        let mut rng = make_test_rng(None);
        let params = fp_params();
        let (structure, public, columns) = cubic(2).finalize();
        let ck = SRS::<Pallas>::create(structure.domain_size);
        let witness = PlainWitness::new(columns, &mut rng);
        let instance = relax(&PlainInstance::new(witness.commit(&ck).unwrap(), public));
        let mut witness = RelaxedWitness::from_plain(&witness);
        witness.error[1] += Fq::one();

        let pk = DeciderProverKey::setup(&structure, &ck).unwrap();
        assert!(matches!(
            prover::prove(&pk, &params, &instance, &witness, &mut rng),
            Err(SangriaError::UnsatisfiedRelation { .. })
        ));
    }

    #[test]
    fn the_shifts_separate_the_columns() {
        let [k0, k1, k2] = shifts::<Fq>();
        let n = 1u64 << 10;
        // kᵢ/kⱼ is not in the domain
        for ratio in [k1 / k0, k2 / k0, k2 / k1] {
            assert_ne!(ratio.pow([n]), Fq::one());
        }
    }
}
