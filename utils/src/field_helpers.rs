//! Helpers on top of arkworks prime fields: checked inversion, sampling,
//! conversions to and from big integers and limb decompositions.

use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use num_integer::Integer;
use rand::Rng;
use thiserror::Error;

// Field helpers error
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldHelpersError {
    #[error("failed to deserialize field bytes")]
    DeserializeBytes,
    #[error("failed to decode hex")]
    DecodeHex,
    #[error("attempted to invert the zero element")]
    InversionOfZero,
    #[error("integer does not fit in the field")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, FieldHelpersError>;

/// Field element helpers
pub trait FieldHelpers<F> {
    /// Deserialize from little-endian bytes
    fn from_bytes(bytes: &[u8]) -> Result<F>;

    /// Deserialize from hex
    fn from_hex(hex: &str) -> Result<F>;

    /// Serialize to little-endian bytes
    fn to_bytes(&self) -> Vec<u8>;

    /// Serialize to hex
    fn to_hex(&self) -> String;

    /// Inverse of a non-zero element.
    fn checked_inverse(&self) -> Result<F>;

    /// Uniformly random element.
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> F;

    /// Canonical integer representative.
    fn to_biguint(&self) -> BigUint;

    /// Inverse of `to_biguint`; fails if the integer is not reduced.
    fn from_biguint(big: &BigUint) -> Result<F>;

    /// Get the modulus as `BigUint`
    fn modulus_biguint() -> BigUint;

    /// The low `bits` bits of the canonical representative.
    fn truncate_to_bits(&self, bits: usize) -> F;

    /// Little-endian decomposition in `n` limbs of `limb_bits` bits each.
    /// The last limb takes whatever is left.
    fn to_limbs(&self, limb_bits: usize, n: usize) -> Vec<F>;
}

impl<F: PrimeField> FieldHelpers<F> for F {
    fn from_bytes(bytes: &[u8]) -> Result<F> {
        if bytes.len() != F::MODULUS_BIT_SIZE.div_ceil(8) as usize {
            return Err(FieldHelpersError::DeserializeBytes);
        }
        F::from_biguint(&BigUint::from_bytes_le(bytes))
            .map_err(|_| FieldHelpersError::DeserializeBytes)
    }

    fn from_hex(hex: &str) -> Result<F> {
        let bytes: Vec<u8> = hex::decode(hex).map_err(|_| FieldHelpersError::DecodeHex)?;
        F::from_bytes(&bytes)
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.into_bigint().to_bytes_le();
        bytes.truncate(F::MODULUS_BIT_SIZE.div_ceil(8) as usize);
        bytes
    }

    fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    fn checked_inverse(&self) -> Result<F> {
        self.inverse().ok_or(FieldHelpersError::InversionOfZero)
    }

    fn sample<R: Rng + ?Sized>(rng: &mut R) -> F {
        F::rand(rng)
    }

    fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_le(&self.into_bigint().to_bytes_le())
    }

    fn from_biguint(big: &BigUint) -> Result<F> {
        if *big >= F::modulus_biguint() {
            return Err(FieldHelpersError::Overflow);
        }
        Ok(F::from_le_bytes_mod_order(&big.to_bytes_le()))
    }

    fn modulus_biguint() -> BigUint {
        BigUint::from_bytes_le(&F::MODULUS.to_bytes_le())
    }

    fn truncate_to_bits(&self, bits: usize) -> F {
        let mask = (BigUint::from(1u32) << bits) - 1u32;
        F::from_le_bytes_mod_order(&(self.to_biguint() & mask).to_bytes_le())
    }

    fn to_limbs(&self, limb_bits: usize, n: usize) -> Vec<F> {
        decompose_biguint(&self.to_biguint(), limb_bits, n)
            .iter()
            .map(|limb| F::from_le_bytes_mod_order(&limb.to_bytes_le()))
            .collect()
    }
}

/// Little-endian limbs of `value`; the last of the `n` limbs keeps the
/// remaining high bits.
pub fn decompose_biguint(value: &BigUint, limb_bits: usize, n: usize) -> Vec<BigUint> {
    let base = BigUint::from(1u32) << limb_bits;
    let mut rest = value.clone();
    let mut limbs = Vec::with_capacity(n);
    for i in 0..n {
        if i + 1 == n {
            limbs.push(rest.clone());
        } else {
            let (q, r) = rest.div_rem(&base);
            limbs.push(r);
            rest = q;
        }
    }
    limbs
}

/// Reinterpret the integer value of `x` in another prime field.
/// Fails when the value is not smaller than the target modulus.
pub fn embed<Src: PrimeField, Dst: PrimeField>(x: &Src) -> Result<Dst> {
    Dst::from_biguint(&x.to_biguint())
}

/// Split a field element into its low 128 bits and the remaining high bits,
/// both returned in the field `Dst`. Every 255-bit value fits this way in
/// any field larger than 2^128.
pub fn split_128<Src: PrimeField, Dst: PrimeField>(x: &Src) -> (Dst, Dst) {
    let big = x.to_biguint();
    let mask = (BigUint::from(1u32) << 128) - 1u32;
    let lo: BigUint = &big & mask;
    let hi: BigUint = big >> 128;
    (
        Dst::from_le_bytes_mod_order(&lo.to_bytes_le()),
        Dst::from_le_bytes_mod_order(&hi.to_bytes_le()),
    )
}

/// Batch-invert a slice in place, failing if any element is zero.
pub fn checked_batch_inverse<F: PrimeField>(v: &mut [F]) -> Result<()> {
    if v.iter().any(|x| x.is_zero()) {
        return Err(FieldHelpersError::InversionOfZero);
    }
    ark_ff::batch_inversion(v);
    Ok(())
}
