//! Instances and witnesses of the plain and relaxed relations, and their
//! combination when folding.

use super::structure::CircuitStructure;
use crate::{Result, NUMBER_OF_COLUMNS};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{One, PrimeField, UniformRand, Zero};
use rand::{CryptoRng, RngCore};
use rayon::prelude::*;
use sangria_poly_commitment::{combine, CommitmentCurve, SRS};
use sangria_utils::serialization::SerdeAs;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// Commitments to the three columns and the public inputs.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "G: ark_serialize::CanonicalDeserialize + ark_serialize::CanonicalSerialize")]
pub struct PlainInstance<G: AffineRepr> {
    #[serde_as(as = "[SerdeAs; 3]")]
    pub commitments: [G; NUMBER_OF_COLUMNS],
    #[serde_as(as = "Vec<SerdeAs>")]
    pub public_inputs: Vec<G::ScalarField>,
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "G: ark_serialize::CanonicalDeserialize + ark_serialize::CanonicalSerialize")]
pub struct RelaxedInstance<G: AffineRepr> {
    #[serde_as(as = "[SerdeAs; 3]")]
    pub commitments: [G; NUMBER_OF_COLUMNS],
    #[serde_as(as = "SerdeAs")]
    pub error_commitment: G,
    #[serde_as(as = "SerdeAs")]
    pub u: G::ScalarField,
    #[serde_as(as = "Vec<SerdeAs>")]
    pub public_inputs: Vec<G::ScalarField>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlainWitness<F> {
    pub columns: [Vec<F>; NUMBER_OF_COLUMNS],
    pub blinders: [F; NUMBER_OF_COLUMNS],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelaxedWitness<F> {
    pub columns: [Vec<F>; NUMBER_OF_COLUMNS],
    pub blinders: [F; NUMBER_OF_COLUMNS],
    pub error: Vec<F>,
    pub error_blinder: F,
}

impl<G: AffineRepr> PlainInstance<G> {
    pub fn new(commitments: [G; NUMBER_OF_COLUMNS], public_inputs: Vec<G::ScalarField>) -> Self {
        Self {
            commitments,
            public_inputs,
        }
    }
}

/// `u = 1`, `E = 0`
pub fn relax<G: AffineRepr>(instance: &PlainInstance<G>) -> RelaxedInstance<G> {
    RelaxedInstance {
        commitments: instance.commitments,
        error_commitment: G::zero(),
        u: G::ScalarField::one(),
        public_inputs: instance.public_inputs.clone(),
    }
}

impl<G: AffineRepr> RelaxedInstance<G> {
    /// The all-zero instance, with `u = 0`. It is satisfied by
    /// [RelaxedWitness::default].
    pub fn default(num_public: usize) -> Self {
        Self {
            commitments: [G::zero(); NUMBER_OF_COLUMNS],
            error_commitment: G::zero(),
            u: G::ScalarField::zero(),
            public_inputs: vec![G::ScalarField::zero(); num_public],
        }
    }

    pub fn from_plain(instance: &PlainInstance<G>) -> Self {
        relax(instance)
    }

    /// `self + r·other`, the error commitment taking the cross term:
    /// `E = E1 + r·T + r²·E2`.
    pub fn fold(&self, other: &Self, comm_t: &G, r: G::ScalarField) -> Self {
        let commitments = std::array::from_fn(|j| combine(&other.commitments[j], &self.commitments[j], r));
        let error_commitment = (self.error_commitment.into_group()
            + *comm_t * r
            + other.error_commitment * (r * r))
            .into_affine();
        let public_inputs = self
            .public_inputs
            .iter()
            .zip(other.public_inputs.iter())
            .map(|(x1, x2)| *x1 + r * x2)
            .collect();
        Self {
            commitments,
            error_commitment,
            u: self.u + r * other.u,
            public_inputs,
        }
    }
}

fn fold_vectors<F: PrimeField>(v1: &[F], v2: &[F], r: F) -> Vec<F> {
    v1.par_iter().zip(v2).map(|(a, b)| *a + r * b).collect()
}

impl<F: PrimeField> PlainWitness<F> {
    /// Columns with fresh random blinding factors.
    pub fn new<R: RngCore + CryptoRng>(columns: [Vec<F>; NUMBER_OF_COLUMNS], rng: &mut R) -> Self {
        let blinders = std::array::from_fn(|_| F::rand(rng));
        Self { columns, blinders }
    }

    pub fn commit<G: CommitmentCurve<ScalarField = F>>(
        &self,
        ck: &SRS<G>,
    ) -> Result<[G; NUMBER_OF_COLUMNS]> {
        let [a, b, c] = &self.columns;
        Ok([
            ck.commit(a, self.blinders[0])?,
            ck.commit(b, self.blinders[1])?,
            ck.commit(c, self.blinders[2])?,
        ])
    }
}

impl<F: PrimeField> RelaxedWitness<F> {
    /// The all-zero witness over `domain_size` rows.
    pub fn default(domain_size: usize) -> Self {
        Self {
            columns: std::array::from_fn(|_| vec![F::zero(); domain_size]),
            blinders: [F::zero(); NUMBER_OF_COLUMNS],
            error: vec![F::zero(); domain_size],
            error_blinder: F::zero(),
        }
    }

    pub fn from_plain(witness: &PlainWitness<F>) -> Self {
        let domain_size = witness.columns[0].len();
        Self {
            columns: witness.columns.clone(),
            blinders: witness.blinders,
            error: vec![F::zero(); domain_size],
            error_blinder: F::zero(),
        }
    }

    /// `self + r·other`, with `E = E1 + r·T + r²·E2` and the matching
    /// blinding factors.
    pub fn fold(&self, other: &Self, t: &[F], t_blinder: F, r: F) -> Self {
        let r2 = r * r;
        let columns = std::array::from_fn(|j| fold_vectors(&self.columns[j], &other.columns[j], r));
        let blinders = std::array::from_fn(|j| self.blinders[j] + r * other.blinders[j]);
        let error = self
            .error
            .par_iter()
            .zip(t.par_iter())
            .zip(other.error.par_iter())
            .map(|((e1, t), e2)| *e1 + r * t + r2 * e2)
            .collect();
        Self {
            columns,
            blinders,
            error,
            error_blinder: self.error_blinder + r * t_blinder + r2 * other.error_blinder,
        }
    }
}

/// The plain relation holds and the commitments open to the witness.
pub fn is_sat_plain<G: CommitmentCurve>(
    structure: &CircuitStructure<G::ScalarField>,
    ck: &SRS<G>,
    instance: &PlainInstance<G>,
    witness: &PlainWitness<G::ScalarField>,
) -> Result<()> {
    structure.check_plain(&instance.public_inputs, &witness.columns)?;
    for ((c, w), blinder) in instance
        .commitments
        .iter()
        .zip(witness.columns.iter())
        .zip(witness.blinders.iter())
    {
        ck.verify_opening(c, w, *blinder)?;
    }
    Ok(())
}

/// The relaxed relation holds and the commitments, including the one to
/// the error vector, open to the witness.
pub fn is_sat_relaxed<G: CommitmentCurve>(
    structure: &CircuitStructure<G::ScalarField>,
    ck: &SRS<G>,
    instance: &RelaxedInstance<G>,
    witness: &RelaxedWitness<G::ScalarField>,
) -> Result<()> {
    structure.check_relaxed(
        instance.u,
        &instance.public_inputs,
        &witness.columns,
        &witness.error,
    )?;
    for ((c, w), blinder) in instance
        .commitments
        .iter()
        .zip(witness.columns.iter())
        .zip(witness.blinders.iter())
    {
        ck.verify_opening(c, w, *blinder)?;
    }
    ck.verify_opening(&instance.error_commitment, &witness.error, witness.error_blinder)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{arithmetization::CircuitBuilder, error::SangriaError};
    use ark_ff::{One, Zero};
    use sangria_curves::pasta::{Fp, Pallas, Vesta};
    use sangria_utils::tests::make_test_rng;

    #[test]
    fn default_pair_is_satisfied() {
        let mut b = CircuitBuilder::<Fp>::new();
        let x = b.alloc(Fp::from(2u64));
        let y = b.mul(x, x);
        b.public_input(y);
        let structure = b.to_structure();
        let ck = SRS::<Vesta>::create(structure.domain_size);
        let instance = RelaxedInstance::<Vesta>::default(1);
        let witness = RelaxedWitness::default(structure.domain_size);
        is_sat_relaxed(&structure, &ck, &instance, &witness).unwrap();
        assert!(instance.u.is_zero());
        assert!(instance.error_commitment.is_zero());
    }

    #[test]
    fn relaxing_keeps_satisfaction() {
        let mut rng = make_test_rng(None);
        let mut b = CircuitBuilder::<Fp>::new();
        let x = b.alloc(Fp::from(2u64));
        let y = b.mul(x, x);
        b.public_input(y);
        let (structure, public_inputs, columns) = b.finalize();
        let ck = SRS::<Vesta>::create(structure.domain_size);
        let witness = PlainWitness::new(columns, &mut rng);
        let instance = PlainInstance::new(witness.commit(&ck).unwrap(), public_inputs);
        is_sat_plain(&structure, &ck, &instance, &witness).unwrap();

        let relaxed = relax(&instance);
        assert_eq!(relaxed.u, Fp::one());
        is_sat_relaxed(&structure, &ck, &relaxed, &RelaxedWitness::from_plain(&witness)).unwrap();

        // another blinding factor does not open the commitment
        let mut wrong = witness.clone();
        wrong.blinders[0] += Fp::one();
        assert_eq!(
            is_sat_plain(&structure, &ck, &instance, &wrong),
            Err(SangriaError::OpeningMismatch)
        );
    }

    #[test]
    fn instance_serialization() {
        let instance = RelaxedInstance::<Pallas>::default(2);
        let bytes = rmp_serde::to_vec(&instance).unwrap();
        let decoded: RelaxedInstance<Pallas> = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(instance, decoded);
    }
}
