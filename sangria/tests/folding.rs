//! Properties of the folding scheme on a small circuit over Pallas.

use ark_ec::AffineRepr;
use ark_ff::{One, UniformRand};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use sangria::{
    arithmetization::{
        is_sat_plain, is_sat_relaxed, relax, CircuitBuilder, CircuitStructure, PlainInstance,
        PlainWitness, RelaxedInstance, RelaxedWitness,
    },
    nifs::{folding_challenge, FoldingProverKey, FoldingVerifierKey, NIFS},
    SangriaError,
};
use sangria_curves::pasta::{Fp, Fq, Pallas};
use sangria_poly_commitment::SRS;
use sangria_poseidon::{pasta::fp_params, poseidon::ArithmeticSpongeParams};
use sangria_utils::tests::make_test_rng;

/// `y = x³ + x + 5` with `x` and `y` public. With `cheat`, the claimed `y`
/// is off by one.
fn cubic(x: Fq, cheat: bool) -> CircuitBuilder<Fq> {
    let mut b = CircuitBuilder::new();
    let x = b.alloc(x);
    b.public_input(x);
    let x2 = b.mul(x, x);
    let x3 = b.mul(x2, x);
    let y = b.linear_combination(&[(Fq::one(), x3), (Fq::one(), x)], Fq::from(5u64));
    let claimed = if cheat {
        let wrong = b.value(y) + Fq::one();
        b.alloc(wrong)
    } else {
        y
    };
    b.public_input(claimed);
    b.assert_equal(claimed, y);
    b
}

struct Setup {
    structure: CircuitStructure<Fq>,
    ck: SRS<Pallas>,
    params: ArithmeticSpongeParams<Fp>,
}

impl Setup {
    fn new() -> Self {
        let (structure, _, _) = cubic(Fq::one(), false).finalize();
        let ck = SRS::create(structure.domain_size);
        Setup {
            structure,
            ck,
            params: fp_params(),
        }
    }

    fn pk(&self) -> FoldingProverKey<'_, Fp, Pallas> {
        FoldingProverKey {
            structure: &self.structure,
            ck: &self.ck,
            verifier_key: FoldingVerifierKey {
                sponge_params: &self.params,
                pp_digest: Fp::from(42u64),
            },
        }
    }

    fn plain(&self, x: Fq, cheat: bool, rng: &mut StdRng) -> (PlainInstance<Pallas>, PlainWitness<Fq>) {
        let (structure, public_inputs, columns) = cubic(x, cheat).finalize();
        assert_eq!(structure, self.structure);
        let witness = PlainWitness::new(columns, rng);
        let commitments = witness.commit(&self.ck).unwrap();
        (PlainInstance::new(commitments, public_inputs), witness)
    }

    fn relaxed(&self, rng: &mut StdRng) -> (RelaxedInstance<Pallas>, RelaxedWitness<Fq>) {
        let x = Fq::rand(rng);
        let (u, w) = self.plain(x, false, rng);
        (relax(&u), RelaxedWitness::from_plain(&w))
    }
}

#[test]
fn relaxation_embeds_the_plain_relation() {
    let setup = Setup::new();
    let mut rng = make_test_rng(None);

    let (u, w) = setup.plain(Fq::from(3u64), false, &mut rng);
    assert_eq!(is_sat_plain(&setup.structure, &setup.ck, &u, &w), Ok(()));
    let relaxed = relax(&u);
    assert_eq!(relaxed.u, Fq::one());
    assert!(relaxed.error_commitment.is_zero());
    assert_eq!(
        is_sat_relaxed(&setup.structure, &setup.ck, &relaxed, &RelaxedWitness::from_plain(&w)),
        Ok(())
    );

    let (u, w) = setup.plain(Fq::from(3u64), true, &mut rng);
    assert!(matches!(
        is_sat_plain(&setup.structure, &setup.ck, &u, &w),
        Err(SangriaError::UnsatisfiedRelation { .. })
    ));
    assert!(matches!(
        is_sat_relaxed(&setup.structure, &setup.ck, &relax(&u), &RelaxedWitness::from_plain(&w)),
        Err(SangriaError::UnsatisfiedRelation { .. })
    ));
}

#[test]
fn default_pair_is_satisfied() {
    let setup = Setup::new();
    let instance = RelaxedInstance::<Pallas>::default(setup.structure.num_public);
    let witness = RelaxedWitness::default(setup.structure.domain_size);
    assert_eq!(is_sat_relaxed(&setup.structure, &setup.ck, &instance, &witness), Ok(()));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn folding_is_complete(seed in any::<u64>()) {
        let setup = Setup::new();
        let pk = setup.pk();
        let mut rng = StdRng::seed_from_u64(seed);

        // plain into plain
        let (u1, w1) = setup.relaxed(&mut rng);
        let (u2, w2) = setup.relaxed(&mut rng);
        let (nifs, (u12, w12)) = NIFS::prove(&pk, &u1, &w1, &u2, &w2, &mut rng).unwrap();
        prop_assert_eq!(is_sat_relaxed(&setup.structure, &setup.ck, &u12, &w12), Ok(()));
        prop_assert_eq!(nifs.verify(&pk.verifier_key, &u1, &u2).unwrap(), u12.clone());

        // relaxed into relaxed, both with a non-trivial error term
        let (u3, w3) = setup.relaxed(&mut rng);
        let (u4, w4) = setup.relaxed(&mut rng);
        let (_, (u34, w34)) = NIFS::prove(&pk, &u3, &w3, &u4, &w4, &mut rng).unwrap();
        let (nifs, (folded, witness)) = NIFS::prove(&pk, &u12, &w12, &u34, &w34, &mut rng).unwrap();
        prop_assert_eq!(is_sat_relaxed(&setup.structure, &setup.ck, &folded, &witness), Ok(()));
        prop_assert_eq!(nifs.verify(&pk.verifier_key, &u12, &u34).unwrap(), folded);

        // the operands are left as they were
        prop_assert_eq!(is_sat_relaxed(&setup.structure, &setup.ck, &u12, &w12), Ok(()));
    }
}

#[test]
fn folding_an_unsatisfied_pair_is_caught() {
    let setup = Setup::new();
    let pk = setup.pk();
    let mut rng = make_test_rng(None);

    let (u1, w1) = setup.relaxed(&mut rng);
    let (u2, w2) = setup.plain(Fq::from(7u64), true, &mut rng);
    let (_, (folded, witness)) = NIFS::prove(
        &pk,
        &u1,
        &w1,
        &relax(&u2),
        &RelaxedWitness::from_plain(&w2),
        &mut rng,
    )
    .unwrap();
    assert!(matches!(
        is_sat_relaxed(&setup.structure, &setup.ck, &folded, &witness),
        Err(SangriaError::UnsatisfiedRelation { .. })
    ));
}

#[test]
fn the_challenge_binds_the_cross_term() {
    let setup = Setup::new();
    let pk = setup.pk();
    let mut rng = make_test_rng(None);

    let (u1, w1) = setup.relaxed(&mut rng);
    let (u2, w2) = setup.relaxed(&mut rng);
    let (nifs, (folded, witness)) = NIFS::prove(&pk, &u1, &w1, &u2, &w2, &mut rng).unwrap();

    let forged = NIFS {
        comm_t: (nifs.comm_t + Pallas::generator()).into(),
    };
    let r = folding_challenge(&pk.verifier_key, &u1, &u2, &nifs.comm_t).unwrap();
    let r_forged = folding_challenge(&pk.verifier_key, &u1, &u2, &forged.comm_t).unwrap();
    assert_ne!(r, r_forged);

    let folded_forged = forged.verify(&pk.verifier_key, &u1, &u2).unwrap();
    assert_ne!(folded_forged, folded);
    assert!(is_sat_relaxed(&setup.structure, &setup.ck, &folded_forged, &witness).is_err());

    // a different parameter digest gives a different challenge
    let other_vk = FoldingVerifierKey {
        pp_digest: Fp::from(43u64),
        ..pk.verifier_key
    };
    assert_ne!(
        folding_challenge(&other_vk, &u1, &u2, &nifs.comm_t).unwrap(),
        r
    );
}
