//! Bit decompositions and range checks.

use crate::{
    arithmetization::{CircuitBuilder, Variable},
    DECOMPOSITION_BITS,
};
use ark_ff::PrimeField;
use sangria_utils::FieldHelpers;

/// Little-endian bits of the value of `v`, each constrained to be boolean
/// and their recomposition constrained to equal `v`. This range-checks `v`
/// to `num_bits` bits.
pub fn to_bits<F: PrimeField>(
    builder: &mut CircuitBuilder<F>,
    v: Variable,
    num_bits: usize,
) -> Vec<Variable> {
    let repr = builder.value(v).to_biguint();
    let bits: Vec<Variable> = (0..num_bits)
        .map(|i| builder.alloc(F::from(repr.bit(i as u64))))
        .collect();
    for bit in bits.iter() {
        builder.assert_boolean(*bit);
    }
    let packed = pack_bits(builder, &bits);
    builder.enforce_equal(packed, v);
    bits
}

/// `Σ 2^i·bits[i]`
pub fn pack_bits<F: PrimeField>(builder: &mut CircuitBuilder<F>, bits: &[Variable]) -> Variable {
    let mut power = F::one();
    let terms: Vec<(F, Variable)> = bits
        .iter()
        .map(|b| {
            let term = (power, *b);
            power.double_in_place();
            term
        })
        .collect();
    builder.linear_combination(&terms, F::zero())
}

pub fn range_check<F: PrimeField>(builder: &mut CircuitBuilder<F>, v: Variable, num_bits: usize) {
    let _ = to_bits(builder, v, num_bits);
}

/// Split `v` into its low `low_bits` bits and the next
/// `DECOMPOSITION_BITS - low_bits` bits. As the decomposition has fewer bits
/// than the modulus, it is unique: `v` is the sum of the parts as integers.
/// Values of `v` needing more bits make the relation unsatisfied; a squeezed
/// element is such a value with negligible probability.
pub fn split_unique<F: PrimeField>(
    builder: &mut CircuitBuilder<F>,
    v: Variable,
    low_bits: usize,
) -> (Vec<Variable>, Variable) {
    let value = builder.value(v);
    let high = F::from_biguint(&(value.to_biguint() >> low_bits)).unwrap_or_else(|_| F::zero());
    let low_var = builder.alloc(value.truncate_to_bits(low_bits));
    let high_var = builder.alloc(high);
    let low_bits_vars = to_bits(builder, low_var, low_bits);
    range_check(builder, high_var, DECOMPOSITION_BITS - low_bits);
    let shift = F::from(2u64).pow([low_bits as u64]);
    let recomposed =
        builder.linear_combination(&[(F::one(), low_var), (shift, high_var)], F::zero());
    builder.enforce_equal(recomposed, v);
    (low_bits_vars, low_var)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{Field, One, UniformRand};
    use sangria_curves::pasta::Fp;
    use sangria_utils::tests::make_test_rng;

    fn is_satisfied(builder: &CircuitBuilder<Fp>) -> bool {
        let (structure, x, columns) = builder.finalize();
        structure.check_plain(&x, &columns).is_ok()
    }

    #[test]
    fn decomposition_of_small_values() {
        let mut builder = CircuitBuilder::<Fp>::new();
        let v = builder.alloc(Fp::from(0b1011u64));
        let bits = to_bits(&mut builder, v, 8);
        let values: Vec<u64> = bits
            .iter()
            .map(|b| if builder.value(*b).is_one() { 1 } else { 0 })
            .collect();
        assert_eq!(values, vec![1, 1, 0, 1, 0, 0, 0, 0]);
        assert!(is_satisfied(&builder));
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        let mut builder = CircuitBuilder::<Fp>::new();
        let v = builder.alloc(Fp::from(256u64));
        range_check(&mut builder, v, 8);
        assert!(!is_satisfied(&builder));
    }

    #[test]
    fn out_of_range_split_is_rejected() {
        let mut builder = CircuitBuilder::<Fp>::new();
        let x = Fp::from(2u64).pow([DECOMPOSITION_BITS as u64]);
        let v = builder.alloc(x);
        let _ = split_unique(&mut builder, v, 128);
        assert!(!is_satisfied(&builder));
    }

    #[test]
    fn unique_split_of_random_values() {
        let mut rng = make_test_rng(None);
        let mut builder = CircuitBuilder::<Fp>::new();
        for _ in 0..4 {
            let x = Fp::rand(&mut rng).truncate_to_bits(DECOMPOSITION_BITS);
            let v = builder.alloc(x);
            let (bits, low) = split_unique(&mut builder, v, 128);
            assert_eq!(bits.len(), 128);
            assert_eq!(builder.value(low), x.truncate_to_bits(128));
        }
        assert!(is_satisfied(&builder));
    }
}
