//! The Poseidon sponge as a circuit, absorbing and squeezing exactly like
//! [sangria_poseidon::poseidon::ArithmeticSponge].
//!
//! A round adds the constants, applies the S-box and the MDS matrix. In
//! circuits, the constants of the next round are added by the gates
//! computing the MDS output, so a full round costs 15 gates and a partial
//! round 9.

use crate::arithmetization::{CircuitBuilder, Variable};
use ark_ff::PrimeField;
use sangria_poseidon::{
    constants::{PlonkSpongeConstants, SpongeConstants},
    poseidon::{ArithmeticSpongeParams, SpongeState},
};

type SC = PlonkSpongeConstants;

const WIDTH: usize = 3;

pub struct PoseidonGadget<'a, F: PrimeField> {
    params: &'a ArithmeticSpongeParams<F>,
    state: [Variable; WIDTH],
    sponge_state: SpongeState,
}

fn sbox<F: PrimeField>(builder: &mut CircuitBuilder<F>, x: Variable) -> Variable {
    let x2 = builder.mul(x, x);
    let x4 = builder.mul(x2, x2);
    builder.mul(x4, x)
}

impl<'a, F: PrimeField> PoseidonGadget<'a, F> {
    pub fn new(builder: &mut CircuitBuilder<F>, params: &'a ArithmeticSpongeParams<F>) -> Self {
        let zero = builder.zero();
        Self {
            params,
            state: [zero; WIDTH],
            sponge_state: SpongeState::Absorbed(0),
        }
    }

    pub fn absorb(&mut self, builder: &mut CircuitBuilder<F>, xs: &[Variable]) {
        for x in xs {
            match self.sponge_state {
                SpongeState::Absorbed(n) => {
                    if n == SC::SPONGE_RATE {
                        self.permute(builder);
                        self.sponge_state = SpongeState::Absorbed(1);
                        self.state[0] = builder.add(self.state[0], *x);
                    } else {
                        self.sponge_state = SpongeState::Absorbed(n + 1);
                        self.state[n] = builder.add(self.state[n], *x);
                    }
                }
                SpongeState::Squeezed(_) => {
                    self.state[0] = builder.add(self.state[0], *x);
                    self.sponge_state = SpongeState::Absorbed(1);
                }
            }
        }
    }

    pub fn squeeze(&mut self, builder: &mut CircuitBuilder<F>) -> Variable {
        match self.sponge_state {
            SpongeState::Squeezed(n) => {
                if n == SC::SPONGE_RATE {
                    self.permute(builder);
                    self.sponge_state = SpongeState::Squeezed(1);
                    self.state[0]
                } else {
                    self.sponge_state = SpongeState::Squeezed(n + 1);
                    self.state[n]
                }
            }
            SpongeState::Absorbed(_) => {
                self.permute(builder);
                self.sponge_state = SpongeState::Squeezed(1);
                self.state[0]
            }
        }
    }

    fn permute(&mut self, builder: &mut CircuitBuilder<F>) {
        let rc = &self.params.round_constants;
        let mds = &self.params.mds;
        let mut state: [Variable; WIDTH] =
            std::array::from_fn(|i| builder.add_constant(self.state[i], rc[0][i]));
        let partial_start = SC::PERM_HALF_ROUNDS_FULL;
        let partial_end = SC::PERM_HALF_ROUNDS_FULL + SC::PERM_ROUNDS_PARTIAL;
        for r in 0..SC::PERM_ROUNDS {
            let full = r < partial_start || r >= partial_end;
            let sboxed: [Variable; WIDTH] = std::array::from_fn(|i| {
                if full || i == 0 {
                    sbox(builder, state[i])
                } else {
                    state[i]
                }
            });
            let next_constants = if r + 1 < SC::PERM_ROUNDS {
                rc[r + 1]
            } else {
                [F::zero(); WIDTH]
            };
            state = std::array::from_fn(|i| {
                let terms: Vec<(F, Variable)> =
                    mds[i].iter().copied().zip(sboxed.iter().copied()).collect();
                builder.linear_combination(&terms, next_constants[i])
            });
        }
        self.state = state;
    }
}
