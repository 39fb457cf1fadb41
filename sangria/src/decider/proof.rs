use ark_ec::AffineRepr;
use sangria_poly_commitment::OpeningProof;
use sangria_utils::serialization::SerdeAs;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// A decider proof. The evaluations follow the order of
/// [super::NUMBER_OF_POLYNOMIALS].
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "G: ark_serialize::CanonicalDeserialize + ark_serialize::CanonicalSerialize")]
pub struct DeciderProof<G: AffineRepr> {
    /// The grand product of the copy permutation
    #[serde_as(as = "SerdeAs")]
    pub z_commitment: G,
    #[serde_as(as = "[SerdeAs; 3]")]
    pub t_commitments: [G; super::QUOTIENT_CHUNKS],
    /// At `ζ`
    #[serde_as(as = "Vec<SerdeAs>")]
    pub evals_zeta: Vec<G::ScalarField>,
    /// At `ζω`
    #[serde_as(as = "Vec<SerdeAs>")]
    pub evals_zeta_omega: Vec<G::ScalarField>,
    pub opening: OpeningProof<G>,
}
