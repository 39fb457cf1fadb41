use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{Field, PrimeField, UniformRand};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use core::str::FromStr;
use num_bigint::BigUint;
use rand::{rngs::StdRng, SeedableRng};
use sangria_curves::pasta::{Fp, Fq, Pallas, ProjectivePallas, ProjectiveVesta, Vesta};

#[test]
fn generators_are_on_curve() {
    assert!(Pallas::generator().is_on_curve());
    assert!(Vesta::generator().is_on_curve());
    assert!(Pallas::generator().is_in_correct_subgroup_assuming_on_curve());
    assert!(Vesta::generator().is_in_correct_subgroup_assuming_on_curve());
}

#[test]
fn biguint_into_returns_canonical_representation() {
    let g = Pallas::generator();
    let x: BigUint = g.x.into();
    let y: BigUint = g.y.into();
    assert_eq!(x, BigUint::from(1u32));
    assert_eq!(
        y,
        BigUint::from_str(
            "12418654782883325593414442427049395787963493412651469444558597405572177144507"
        )
        .unwrap()
    );
}

#[test]
fn scalar_field_is_group_order() {
    // multiplying by the order of the group gives the identity
    let mut rng = StdRng::seed_from_u64(0);
    let p = ProjectivePallas::rand(&mut rng);
    let minus_one = -Fq::from(1u64);
    assert_eq!(p * minus_one + p, ProjectivePallas::default());

    let v = ProjectiveVesta::rand(&mut rng);
    let minus_one = -Fp::from(1u64);
    assert_eq!(v * minus_one + v, ProjectiveVesta::default());
}

#[test]
fn fields_swap_across_the_cycle() {
    assert_eq!(
        <Pallas as AffineRepr>::BaseField::MODULUS,
        <Vesta as AffineRepr>::ScalarField::MODULUS
    );
    assert_eq!(
        <Vesta as AffineRepr>::BaseField::MODULUS,
        <Pallas as AffineRepr>::ScalarField::MODULUS
    );
}

#[test]
fn addition_matches_doubling() {
    let g = Vesta::generator();
    let double: Vesta = (g + g).into_affine();
    let via_scalar: Vesta = (g * Fp::from(2u64)).into_affine();
    assert_eq!(double, via_scalar);
    // x³ + 5 = y²
    let (x, y) = (double.x, double.y);
    assert_eq!(x.pow([3]) + Fq::from(5u64), y.square());
}

#[test]
fn serialization_round_trip() {
    let mut rng = StdRng::seed_from_u64(1);
    let p = ProjectivePallas::rand(&mut rng).into_affine();
    let mut bytes = vec![];
    p.serialize_compressed(&mut bytes).unwrap();
    let q = Pallas::deserialize_compressed(&bytes[..]).unwrap();
    assert_eq!(p, q);
}
