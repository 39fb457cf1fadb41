use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{UniformRand, Zero};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use sangria_curves::pasta::{Fp, Vesta};
use sangria_poly_commitment::{combine, CommitmentError, SRS};
use sangria_utils::tests::make_test_rng;

fn random_vector(rng: &mut StdRng, n: usize) -> Vec<Fp> {
    (0..n).map(|_| Fp::rand(rng)).collect()
}

#[test]
fn commitment_is_deterministic() {
    let srs = SRS::<Vesta>::create(16);
    let mut rng = make_test_rng(None);
    let v = random_vector(&mut rng, 16);
    let blinding = Fp::rand(&mut rng);
    assert_eq!(srs.commit(&v, blinding).unwrap(), srs.commit(&v, blinding).unwrap());
    assert_ne!(srs.commit(&v, blinding).unwrap(), srs.commit(&v, Fp::zero()).unwrap());
}

#[test]
fn zero_vector_commits_to_identity() {
    let srs = SRS::<Vesta>::create(8);
    let v = vec![Fp::zero(); 8];
    assert!(srs.commit(&v, Fp::zero()).unwrap().is_zero());
    assert!(srs.commit(&[], Fp::zero()).unwrap().is_zero());
}

#[test]
fn opening_mismatch_is_reported() {
    let srs = SRS::<Vesta>::create(8);
    let mut rng = make_test_rng(None);
    let mut v = random_vector(&mut rng, 8);
    let blinding = Fp::rand(&mut rng);
    let c = srs.commit(&v, blinding).unwrap();
    assert_eq!(srs.verify_opening(&c, &v, blinding), Ok(()));
    assert_eq!(
        srs.verify_opening(&c, &v, blinding + Fp::from(1u64)),
        Err(CommitmentError::OpeningMismatch)
    );
    v[3] += Fp::from(1u64);
    assert_eq!(
        srs.verify_opening(&c, &v, blinding),
        Err(CommitmentError::OpeningMismatch)
    );
}

#[test]
fn vectors_longer_than_the_key_are_rejected() {
    let srs = SRS::<Vesta>::create(4);
    let v = vec![Fp::from(1u64); 5];
    assert_eq!(
        srs.commit(&v, Fp::zero()),
        Err(CommitmentError::VectorTooLong(5, 4))
    );
    let c = Vesta::generator();
    assert_eq!(
        srs.verify_opening(&c, &v, Fp::zero()),
        Err(CommitmentError::OpeningMismatch)
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn commitments_are_homomorphic(seed in any::<u64>()) {
        let srs = SRS::<Vesta>::create(8);
        let mut rng = StdRng::seed_from_u64(seed);
        let v1 = random_vector(&mut rng, 8);
        let v2 = random_vector(&mut rng, 8);
        let (b1, b2, r) = (Fp::rand(&mut rng), Fp::rand(&mut rng), Fp::rand(&mut rng));

        let c1 = srs.commit(&v1, b1).unwrap();
        let c2 = srs.commit(&v2, b2).unwrap();
        let folded: Vec<Fp> = v1.iter().zip(&v2).map(|(x, y)| r * x + y).collect();
        let expected = srs.commit(&folded, r * b1 + b2).unwrap();
        prop_assert_eq!(combine(&c1, &c2, r), expected);
        prop_assert_eq!((c1 + c2).into_affine(), srs.commit(
            &v1.iter().zip(&v2).map(|(x, y)| *x + y).collect::<Vec<_>>(),
            b1 + b2,
        ).unwrap());
    }
}
