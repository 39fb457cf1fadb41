//! The commitment key: a list of generators and a blinding generator, all
//! derived by hashing to the curve. There is no trusted setup.

use crate::commitment::CommitmentCurve;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Instant;

pub const DEFAULT_TAG: &str = "sangria/srs";

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "G: ark_serialize::CanonicalDeserialize + ark_serialize::CanonicalSerialize")]
pub struct SRS<G> {
    /// The generators of the vector commitment, read as the Lagrange basis
    /// of an evaluation domain.
    #[serde_as(as = "Vec<sangria_utils::serialization::SerdeAs>")]
    pub g: Vec<G>,

    /// A group element used for blinding commitments
    #[serde_as(as = "sangria_utils::serialization::SerdeAs")]
    pub h: G,
}

impl<G: CommitmentCurve> SRS<G> {
    /// Key for vectors of up to `depth` entries, with the default tag.
    pub fn create(depth: usize) -> Self {
        Self::create_with_tag(DEFAULT_TAG, depth)
    }

    /// Derive `depth` generators and the blinding generator from `tag`.
    pub fn create_with_tag(tag: &str, depth: usize) -> Self {
        let start = Instant::now();
        let g: Vec<G> = (0..depth)
            .into_par_iter()
            .map(|i| {
                let bytes = [tag.as_bytes(), b"/g/", &(i as u64).to_le_bytes()].concat();
                G::hash_to_curve(&bytes)
            })
            .collect();

        let h = G::hash_to_curve(&[tag.as_bytes(), b"/h"].concat());

        debug!(
            "Derived {} generators for tag {} in {:?}",
            depth,
            tag,
            start.elapsed()
        );
        Self { g, h }
    }

    pub fn max_size(&self) -> usize {
        self.g.len()
    }
}
