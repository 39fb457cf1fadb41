//! The permutation module contains the function implementing the permutation
//! used in Poseidon.

use ark_ff::Field;

use crate::{
    constants::SpongeConstants,
    poseidon::{sbox, ArithmeticSpongeParams},
};

pub fn apply_mds_matrix<F: Field>(params: &ArithmeticSpongeParams<F>, state: &[F]) -> Vec<F> {
    params
        .mds
        .iter()
        .map(|m| {
            state
                .iter()
                .zip(m.iter())
                .fold(F::zero(), |x, (s, &m)| m * s + x)
        })
        .collect()
}

fn add_round_constants<F: Field>(params: &ArithmeticSpongeParams<F>, state: &mut [F], r: usize) {
    for (i, x) in params.round_constants[r].iter().enumerate() {
        state[i].add_assign(x);
    }
}

/// Apply a full round of the permutation: round constants, S-box on every
/// element of the state, MDS.
pub fn full_round<F: Field, SC: SpongeConstants>(
    params: &ArithmeticSpongeParams<F>,
    state: &mut [F],
    r: usize,
) {
    add_round_constants(params, state, r);
    for state_i in state.iter_mut() {
        *state_i = sbox::<F, SC>(*state_i);
    }
    let res = apply_mds_matrix(params, state);
    state.copy_from_slice(&res);
}

/// Apply a partial round: round constants, S-box on the first element only,
/// MDS.
pub fn partial_round<F: Field, SC: SpongeConstants>(
    params: &ArithmeticSpongeParams<F>,
    state: &mut [F],
    r: usize,
) {
    add_round_constants(params, state, r);
    state[0] = sbox::<F, SC>(state[0]);
    let res = apply_mds_matrix(params, state);
    state.copy_from_slice(&res);
}

/// Half of the full rounds, the partial rounds, then the other half of the
/// full rounds. Round constants are consumed row by row in that order.
pub fn half_rounds<F: Field, SC: SpongeConstants>(
    params: &ArithmeticSpongeParams<F>,
    state: &mut [F],
) {
    for r in 0..SC::PERM_HALF_ROUNDS_FULL {
        full_round::<F, SC>(params, state, r);
    }

    for r in 0..SC::PERM_ROUNDS_PARTIAL {
        partial_round::<F, SC>(params, state, SC::PERM_HALF_ROUNDS_FULL + r);
    }

    for r in 0..SC::PERM_HALF_ROUNDS_FULL {
        full_round::<F, SC>(
            params,
            state,
            SC::PERM_HALF_ROUNDS_FULL + SC::PERM_ROUNDS_PARTIAL + r,
        );
    }
}

pub fn poseidon_block_cipher<F: Field, SC: SpongeConstants>(
    params: &ArithmeticSpongeParams<F>,
    state: &mut [F],
) {
    half_rounds::<F, SC>(params, state);
}
