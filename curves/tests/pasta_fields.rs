use ark_ff::{FftField, Field, One, PrimeField, UniformRand, Zero};
use rand::{rngs::StdRng, SeedableRng};
use sangria_curves::pasta::{Fp, Fq};

#[test]
fn moduli_are_ordered() {
    // every element of Fp has a representative in Fq
    assert!(Fp::MODULUS < Fq::MODULUS);
    assert_eq!(Fp::MODULUS_BIT_SIZE, 255);
    assert_eq!(Fq::MODULUS_BIT_SIZE, 255);
}

#[test]
fn two_adicity() {
    assert_eq!(Fp::TWO_ADICITY, 32);
    assert_eq!(Fq::TWO_ADICITY, 32);
    let root = Fp::get_root_of_unity(1 << 16).unwrap();
    assert_eq!(root.pow([1 << 16]), Fp::one());
    assert_ne!(root.pow([1 << 15]), Fp::one());
}

#[test]
fn field_axioms() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..32 {
        let a = Fq::rand(&mut rng);
        let b = Fq::rand(&mut rng);
        assert_eq!(a * (b + Fq::one()), a * b + a);
        if !a.is_zero() {
            assert_eq!(a * a.inverse().unwrap(), Fq::one());
        }
    }
    assert!(Fq::zero().inverse().is_none());
}
