//! This module implements Poseidon Hash Function primitive

use crate::{constants::SpongeConstants, permutation::poseidon_block_cipher};
use ark_ff::{Field, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use blake2::{Blake2b512, Digest};
use sangria_utils::FieldHelpers;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// Cryptographic sponge interface - for hashing an arbitrary amount of
/// data into one or more field elements
pub trait Sponge<'a, Input: Field, Digest> {
    /// Create a new cryptographic sponge using arithmetic sponge `params`
    fn new(params: &'a ArithmeticSpongeParams<Input>) -> Self;

    /// Absorb an array of field elements `x`
    fn absorb(&mut self, x: &[Input]);

    /// Squeeze an output from the sponge
    fn squeeze(&mut self) -> Digest;

    /// Reset the sponge back to its initial state (as if it were just created)
    fn reset(&mut self);
}

pub fn sbox<F: Field, SC: SpongeConstants>(x: F) -> F {
    if SC::PERM_SBOX == 5 {
        let mut square = x;
        square.square_in_place();
        square.square_in_place();
        square * x
    } else {
        x.pow([SC::PERM_SBOX as u64])
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpongeState {
    Absorbed(usize),
    Squeezed(usize),
}

/// Round constants (one row of width 3 per round) and MDS matrix of a
/// Poseidon instance.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArithmeticSpongeParams<F: Field + CanonicalSerialize + CanonicalDeserialize> {
    #[serde_as(as = "Vec<[sangria_utils::serialization::SerdeAs; 3]>")]
    pub round_constants: Vec<[F; 3]>,
    #[serde_as(as = "[[sangria_utils::serialization::SerdeAs; 3]; 3]")]
    pub mds: [[F; 3]; 3],
}

impl<F: PrimeField> ArithmeticSpongeParams<F> {
    /// Derive a parameter set for the field `F`. Round constants are
    /// BLAKE2b-512 outputs over `(tag, modulus, round, column)` reduced
    /// modulo the field; the MDS matrix is the Cauchy matrix
    /// `1 / (i + 3 + j)`.
    pub fn generate<SC: SpongeConstants>(tag: &str) -> Self {
        let modulus = F::modulus_biguint().to_bytes_le();
        let round_constants = (0..SC::PERM_ROUNDS)
            .map(|round| {
                let mut row = [F::zero(); 3];
                for (column, constant) in row.iter_mut().enumerate() {
                    let mut hasher = Blake2b512::new();
                    hasher.update(tag.as_bytes());
                    hasher.update(&modulus);
                    hasher.update((round as u64).to_le_bytes());
                    hasher.update((column as u64).to_le_bytes());
                    *constant = F::from_le_bytes_mod_order(&hasher.finalize());
                }
                row
            })
            .collect();

        let width = SC::SPONGE_WIDTH as u64;
        let mut mds = [[F::zero(); 3]; 3];
        for (i, row) in mds.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                let denominator = F::from(i as u64 + width + j as u64);
                // the denominators are in 3..=7, never zero
                *entry = denominator.inverse().unwrap_or_else(F::one);
            }
        }

        ArithmeticSpongeParams {
            round_constants,
            mds,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ArithmeticSponge<'a, F: Field, SC: SpongeConstants> {
    pub sponge_state: SpongeState,
    rate: usize,
    pub state: Vec<F>,
    params: &'a ArithmeticSpongeParams<F>,
    pub constants: core::marker::PhantomData<SC>,
}

impl<'a, F: Field, SC: SpongeConstants> ArithmeticSponge<'a, F, SC> {
    pub fn params(&self) -> &'a ArithmeticSpongeParams<F> {
        self.params
    }

    pub fn poseidon_block_cipher(&mut self) {
        poseidon_block_cipher::<F, SC>(self.params, &mut self.state);
    }
}

impl<'a, F: Field, SC: SpongeConstants> Sponge<'a, F, F> for ArithmeticSponge<'a, F, SC> {
    fn new(params: &'a ArithmeticSpongeParams<F>) -> Self {
        let capacity = SC::SPONGE_CAPACITY;
        let rate = SC::SPONGE_RATE;

        Self {
            state: vec![F::zero(); capacity + rate],
            rate,
            sponge_state: SpongeState::Absorbed(0),
            params,
            constants: core::marker::PhantomData,
        }
    }

    fn absorb(&mut self, x: &[F]) {
        for x in x.iter() {
            match self.sponge_state {
                SpongeState::Absorbed(n) => {
                    if n == self.rate {
                        self.poseidon_block_cipher();
                        self.sponge_state = SpongeState::Absorbed(1);
                        self.state[0].add_assign(x);
                    } else {
                        self.sponge_state = SpongeState::Absorbed(n + 1);
                        self.state[n].add_assign(x);
                    }
                }
                SpongeState::Squeezed(_n) => {
                    self.state[0].add_assign(x);
                    self.sponge_state = SpongeState::Absorbed(1);
                }
            }
        }
    }

    fn squeeze(&mut self) -> F {
        match self.sponge_state {
            SpongeState::Squeezed(n) => {
                if n == self.rate {
                    self.poseidon_block_cipher();
                    self.sponge_state = SpongeState::Squeezed(1);
                    self.state[0]
                } else {
                    self.sponge_state = SpongeState::Squeezed(n + 1);
                    self.state[n]
                }
            }
            SpongeState::Absorbed(_n) => {
                self.poseidon_block_cipher();
                self.sponge_state = SpongeState::Squeezed(1);
                self.state[0]
            }
        }
    }

    fn reset(&mut self) {
        self.state = vec![F::zero(); self.state.len()];
        self.sponge_state = SpongeState::Absorbed(0);
    }
}
