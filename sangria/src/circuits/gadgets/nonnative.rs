//! Elements of the other field of the cycle, as four 64-bit limbs.
//!
//! The only operation needed is `a + r·x mod q` for a 128-bit `r`, used to
//! fold the public inputs of the instances of the other side. It is proven
//! with a quotient `k` and the integer identity `a + r·x = k·q + res`,
//! checked limb position by limb position with signed carries.

use super::bits::{pack_bits, range_check};
use crate::{
    arithmetization::{CircuitBuilder, Variable},
    LIMB_BITS, NUMBER_OF_LIMBS,
};
use ark_ff::PrimeField;
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use sangria_utils::{field_helpers::decompose_biguint, FieldHelpers};

/// Limbs of the quotient of `a + r·x` by the modulus: it has at most 131 bits.
const QUOTIENT_LIMBS: usize = 3;

/// Carries are shifted by `2^CARRY_OFFSET_BITS` to be range-checked as
/// unsigned values of `CARRY_OFFSET_BITS + 1` bits. They are bounded by
/// `2^68` in absolute value.
const CARRY_OFFSET_BITS: usize = 70;

fn biguint_to_field<F: PrimeField>(x: &BigUint) -> F {
    F::from_le_bytes_mod_order(&x.to_bytes_le())
}

fn bigint_to_field<F: PrimeField>(x: &BigInt) -> F {
    let magnitude = biguint_to_field::<F>(x.magnitude());
    if x.sign() == Sign::Minus {
        -magnitude
    } else {
        magnitude
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocatedNonNative {
    pub limbs: [Variable; NUMBER_OF_LIMBS],
    value: BigUint,
}

impl AllocatedNonNative {
    /// Allocate the limbs of `value`, range-checked to 64 bits, except the
    /// last one which is checked to `top_limb_bits` bits.
    pub fn alloc<F: PrimeField>(
        builder: &mut CircuitBuilder<F>,
        value: &BigUint,
        top_limb_bits: usize,
    ) -> Self {
        let limbs_values = decompose_biguint(value, LIMB_BITS, NUMBER_OF_LIMBS);
        let limbs: [Variable; NUMBER_OF_LIMBS] =
            std::array::from_fn(|i| builder.alloc(biguint_to_field(&limbs_values[i])));
        for (i, limb) in limbs.iter().enumerate() {
            let bits = if i + 1 == NUMBER_OF_LIMBS {
                top_limb_bits
            } else {
                LIMB_BITS
            };
            range_check(builder, *limb, bits);
        }
        Self {
            limbs,
            value: value.clone(),
        }
    }

    pub fn zero<F: PrimeField>(builder: &mut CircuitBuilder<F>) -> Self {
        let zero = builder.zero();
        Self {
            limbs: [zero; NUMBER_OF_LIMBS],
            value: BigUint::from(0u32),
        }
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn select<F: PrimeField>(
        builder: &mut CircuitBuilder<F>,
        cond: Variable,
        t: &Self,
        f: &Self,
    ) -> Self {
        let limbs = std::array::from_fn(|i| builder.select(cond, t.limbs[i], f.limbs[i]));
        let value = if builder.value(cond).is_one() {
            t.value.clone()
        } else {
            f.value.clone()
        };
        Self { limbs, value }
    }

    /// The low and high 128 bits, as absorbed by transcripts.
    pub fn halves<F: PrimeField>(&self, builder: &mut CircuitBuilder<F>) -> [Variable; 2] {
        let shift = F::from(2u64).pow([LIMB_BITS as u64]);
        let [l0, l1, l2, l3] = self.limbs;
        [
            builder.linear_combination(&[(F::one(), l0), (shift, l1)], F::zero()),
            builder.linear_combination(&[(F::one(), l2), (shift, l3)], F::zero()),
        ]
    }

    /// The value as a native element. Only meaningful when the value is
    /// known to be smaller than the native modulus, e.g. when the top limb
    /// is range-checked to fewer bits.
    pub fn to_native<F: PrimeField>(&self, builder: &mut CircuitBuilder<F>) -> Variable {
        let mut shift = F::one();
        let base = F::from(2u64).pow([LIMB_BITS as u64]);
        let terms: Vec<(F, Variable)> = self
            .limbs
            .iter()
            .map(|l| {
                let term = (shift, *l);
                shift *= base;
                term
            })
            .collect();
        builder.linear_combination(&terms, F::zero())
    }

    /// Constrain the value to be below `modulus`, with limbs of some `d`
    /// such that `value + d = modulus - 1`, position by position with
    /// boolean carries.
    pub fn assert_below<F: PrimeField>(&self, builder: &mut CircuitBuilder<F>, modulus: &BigUint) {
        let bound = modulus - 1u32;
        let d_value = if self.value <= bound {
            &bound - &self.value
        } else {
            BigUint::from(0u8)
        };
        let d = Self::alloc(builder, &d_value, LIMB_BITS);
        let bound_limbs = decompose_biguint(&bound, LIMB_BITS, NUMBER_OF_LIMBS);
        let base = F::from(2u64).pow([LIMB_BITS as u64]);
        let mut carry: Option<(Variable, BigUint)> = None;
        for j in 0..NUMBER_OF_LIMBS {
            let mut terms = vec![(F::one(), self.limbs[j]), (F::one(), d.limbs[j])];
            let mut sum_value =
                builder.value(self.limbs[j]).to_biguint() + builder.value(d.limbs[j]).to_biguint();
            if let Some((c, c_value)) = &carry {
                terms.push((F::one(), *c));
                sum_value += c_value;
            }
            if j + 1 < NUMBER_OF_LIMBS {
                let c_value: BigUint = sum_value >> LIMB_BITS;
                let c = builder.alloc(biguint_to_field(&c_value));
                builder.assert_boolean(c);
                terms.push((-base, c));
                carry = Some((c, c_value));
            }
            let diff =
                builder.linear_combination(&terms, -biguint_to_field::<F>(&bound_limbs[j]));
            builder.assert_zero(diff);
        }
    }

    /// `a + r·x mod modulus`, the result being in canonical form. `r` is
    /// given by its 128 little-endian bits.
    pub fn mul_add_mod<F: PrimeField>(
        builder: &mut CircuitBuilder<F>,
        a: &Self,
        r_bits: &[Variable],
        x: &Self,
        modulus: &BigUint,
    ) -> Self {
        let r_limbs = [
            pack_bits(builder, &r_bits[..LIMB_BITS]),
            pack_bits(builder, &r_bits[LIMB_BITS..2 * LIMB_BITS]),
        ];
        let r_value =
            builder.value(r_limbs[0]).to_biguint() + (builder.value(r_limbs[1]).to_biguint() << LIMB_BITS);

        let (k, res_value) = (&a.value + &r_value * &x.value).div_rem(modulus);
        let res = Self::alloc(builder, &res_value, LIMB_BITS);
        res.assert_below(builder, modulus);
        let k_values = decompose_biguint(&k, LIMB_BITS, QUOTIENT_LIMBS);
        let k_limbs: [Variable; QUOTIENT_LIMBS] =
            std::array::from_fn(|i| builder.alloc(biguint_to_field(&k_values[i])));
        for limb in k_limbs.iter() {
            range_check(builder, *limb, LIMB_BITS);
        }
        let q_limbs = decompose_biguint(modulus, LIMB_BITS, NUMBER_OF_LIMBS);
        let a_limbs = decompose_biguint(&a.value, LIMB_BITS, NUMBER_OF_LIMBS);
        let res_limbs = decompose_biguint(&res_value, LIMB_BITS, NUMBER_OF_LIMBS);

        // (position, product) for every r_i·x_l
        let mut products = Vec::with_capacity(2 * NUMBER_OF_LIMBS);
        for (i, r) in r_limbs.iter().enumerate() {
            for (l, x_l) in x.limbs.iter().enumerate() {
                products.push((i + l, builder.mul(*r, *x_l)));
            }
        }

        // D_j + c_{j-1} = 2^64·c_j, with
        // D_j = a_j + Σ r_i·x_l - Σ k_i·q_l - res_j over i + l = j
        let positions = NUMBER_OF_LIMBS + QUOTIENT_LIMBS - 1;
        let base = BigInt::from(1u8) << LIMB_BITS;
        let field_base = F::from(2u64).pow([LIMB_BITS as u64]);
        let offset = F::from(2u64).pow([CARRY_OFFSET_BITS as u64]);
        let zero = builder.zero();
        let mut carry: Option<(Variable, BigInt)> = None;
        for j in 0..positions {
            let mut terms: Vec<(F, Variable)> = vec![];
            let mut d = BigInt::from(0u8);
            if j < NUMBER_OF_LIMBS {
                terms.push((F::one(), a.limbs[j]));
                terms.push((-F::one(), res.limbs[j]));
                d += BigInt::from(a_limbs[j].clone()) - BigInt::from(res_limbs[j].clone());
            }
            for (_, p) in products.iter().filter(|(pos, _)| *pos == j) {
                terms.push((F::one(), *p));
                d += BigInt::from(builder.value(*p).to_biguint());
            }
            for (i, k) in k_limbs.iter().enumerate() {
                if j >= i && j - i < NUMBER_OF_LIMBS {
                    let q = &q_limbs[j - i];
                    terms.push((-biguint_to_field::<F>(q), *k));
                    d -= BigInt::from(k_values[i].clone()) * BigInt::from(q.clone());
                }
            }
            if let Some((c, c_value)) = &carry {
                terms.push((F::one(), *c));
                d += c_value;
            }
            if j + 1 < positions {
                let c_value = d.div_floor(&base);
                let c = builder.alloc(bigint_to_field(&c_value));
                let shifted = builder.add_constant(c, offset);
                range_check(builder, shifted, CARRY_OFFSET_BITS + 1);
                terms.push((-field_base, c));
                carry = Some((c, c_value));
            }
            let sum = builder.linear_combination(&terms, F::zero());
            builder.assert_equal(sum, zero);
        }
        res
    }
}
