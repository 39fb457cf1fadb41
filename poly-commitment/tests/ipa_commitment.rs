use ark_ff::{UniformRand, Zero};
use ark_poly::{EvaluationDomain, Evaluations, Polynomial, Radix2EvaluationDomain as D};
use rand::rngs::StdRng;
use sangria_curves::pasta::{Fp, Fq, Vesta};
use sangria_poly_commitment::{Evaluation, OpeningProof, SRS};
use sangria_poseidon::{
    constants::PlonkSpongeConstants, pasta::fq_params, poseidon::ArithmeticSpongeParams,
    sponge::DefaultFqSponge, FqSponge,
};
use sangria_utils::tests::make_test_rng;

type Sponge<'a> = DefaultFqSponge<'a, Vesta, PlonkSpongeConstants>;

struct Setup {
    srs: SRS<Vesta>,
    domain: D<Fp>,
    params: ArithmeticSpongeParams<Fq>,
}

fn setup(n: usize) -> Setup {
    Setup {
        srs: SRS::<Vesta>::create(n),
        domain: D::<Fp>::new(n).unwrap(),
        params: fq_params(),
    }
}

struct Opening {
    evaluations: Vec<Evaluation<Vesta>>,
    elm: Vec<Fp>,
    polyscale: Fp,
    evalscale: Fp,
    proof: OpeningProof<Vesta>,
}

fn open(s: &Setup, rng: &mut StdRng, count: usize) -> Opening {
    let n = s.domain.size();
    let vectors: Vec<(Vec<Fp>, Fp)> = (0..count)
        .map(|_| ((0..n).map(|_| Fp::rand(rng)).collect(), Fp::rand(rng)))
        .collect();
    let zeta = Fp::rand(rng);
    let elm = vec![zeta, zeta * s.domain.group_gen];

    let evaluations: Vec<Evaluation<Vesta>> = vectors
        .iter()
        .map(|(v, blinding)| {
            let poly = Evaluations::from_vec_and_domain(v.clone(), s.domain).interpolate();
            Evaluation {
                commitment: s.srs.commit(v, *blinding).unwrap(),
                evaluations: elm.iter().map(|x| poly.evaluate(x)).collect(),
            }
        })
        .collect();

    let polyscale = Fp::rand(rng);
    let evalscale = Fp::rand(rng);
    let refs: Vec<(&[Fp], Fp)> = vectors.iter().map(|(v, b)| (v.as_slice(), *b)).collect();
    let proof = s
        .srs
        .open(
            s.domain,
            &refs,
            &elm,
            polyscale,
            evalscale,
            Sponge::new(&s.params),
            rng,
        )
        .unwrap();
    Opening {
        evaluations,
        elm,
        polyscale,
        evalscale,
        proof,
    }
}

fn verify(s: &Setup, o: &Opening) -> bool {
    s.srs.verify(
        s.domain,
        &o.evaluations,
        &o.elm,
        o.polyscale,
        o.evalscale,
        &o.proof,
        Sponge::new(&s.params),
    )
}

#[test]
fn opening_is_accepted() {
    let s = setup(32);
    let mut rng = make_test_rng(None);
    let o = open(&s, &mut rng, 4);
    assert!(verify(&s, &o));
}

#[test]
fn single_vector() {
    let s = setup(8);
    let mut rng = make_test_rng(None);
    let mut o = open(&s, &mut rng, 1);
    assert!(verify(&s, &o));
    // a missing round
    o.proof.lr.pop();
    assert!(!verify(&s, &o));
}

#[test]
fn wrong_evaluation_is_rejected() {
    let s = setup(16);
    let mut rng = make_test_rng(None);
    let mut o = open(&s, &mut rng, 3);
    o.evaluations[1].evaluations[0] += Fp::from(1u64);
    assert!(!verify(&s, &o));
}

#[test]
fn tampered_proof_is_rejected() {
    let s = setup(16);
    let mut rng = make_test_rng(None);
    let o = open(&s, &mut rng, 2);

    let mut bad = clone_opening(&o);
    bad.proof.z1 += Fp::from(1u64);
    assert!(!verify(&s, &bad));

    let mut bad = clone_opening(&o);
    bad.proof.lr.swap(0, 1);
    assert!(!verify(&s, &bad));

    let mut bad = clone_opening(&o);
    bad.polyscale += Fp::from(1u64);
    assert!(!verify(&s, &bad));

    let mut bad = clone_opening(&o);
    bad.evaluations.pop();
    assert!(!verify(&s, &bad));
}

#[test]
fn zero_vectors_open_to_zero() {
    let s = setup(8);
    let mut rng = make_test_rng(None);
    let v = vec![Fp::zero(); 8];
    let zeta = Fp::rand(&mut rng);
    let elm = vec![zeta];
    let proof = s
        .srs
        .open(
            s.domain,
            &[(v.as_slice(), Fp::zero())],
            &elm,
            Fp::from(2u64),
            Fp::from(3u64),
            Sponge::new(&s.params),
            &mut rng,
        )
        .unwrap();
    let o = Opening {
        evaluations: vec![Evaluation {
            commitment: s.srs.commit(&v, Fp::zero()).unwrap(),
            evaluations: vec![Fp::zero()],
        }],
        elm,
        polyscale: Fp::from(2u64),
        evalscale: Fp::from(3u64),
        proof,
    };
    assert!(verify(&s, &o));
}

#[test]
fn proof_serialization_round_trip() {
    let s = setup(8);
    let mut rng = make_test_rng(None);
    let o = open(&s, &mut rng, 2);
    let bytes = rmp_serde::to_vec(&o.proof).unwrap();
    let decoded: OpeningProof<Vesta> = rmp_serde::from_slice(&bytes).unwrap();
    assert_eq!(decoded, o.proof);
}

fn clone_opening(o: &Opening) -> Opening {
    Opening {
        evaluations: o.evaluations.clone(),
        elm: o.elm.clone(),
        polyscale: o.polyscale,
        evalscale: o.evalscale,
        proof: o.proof.clone(),
    }
}
