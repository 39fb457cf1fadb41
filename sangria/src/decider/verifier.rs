use super::{domain, shifts, DeciderProof, DeciderVerifierKey, NUMBER_OF_POLYNOMIALS};
use crate::{
    arithmetization::RelaxedInstance, transcript::Transcript, Result, NUMBER_OF_COLUMNS,
};
use ark_ff::{Field, One, PrimeField};
use ark_poly::EvaluationDomain;
use log::debug;
use sangria_poly_commitment::{CommitmentCurve, Evaluation};
use sangria_poseidon::poseidon::ArithmeticSpongeParams;

/// Check a decider proof for `instance`. Malformed proofs are rejected,
/// never panicked on.
pub fn verify<F, G>(
    vk: &DeciderVerifierKey<G>,
    sponge_params: &ArithmeticSpongeParams<F>,
    instance: &RelaxedInstance<G>,
    proof: &DeciderProof<G>,
) -> bool
where
    F: PrimeField,
    G: CommitmentCurve<BaseField = F>,
{
    match check(vk, sponge_params, instance, proof) {
        Ok(valid) => valid,
        Err(e) => {
            debug!("Decider proof rejected: {e}");
            false
        }
    }
}

fn check<F, G>(
    vk: &DeciderVerifierKey<G>,
    sponge_params: &ArithmeticSpongeParams<F>,
    instance: &RelaxedInstance<G>,
    proof: &DeciderProof<G>,
) -> Result<bool>
where
    F: PrimeField,
    G: CommitmentCurve<BaseField = F>,
{
    if instance.public_inputs.len() != vk.num_public {
        debug!("Decider: wrong number of public inputs");
        return Ok(false);
    }
    let (Ok(evals), Ok(evals_omega)) = (
        <[G::ScalarField; NUMBER_OF_POLYNOMIALS]>::try_from(proof.evals_zeta.as_slice()),
        <[G::ScalarField; NUMBER_OF_POLYNOMIALS]>::try_from(proof.evals_zeta_omega.as_slice()),
    ) else {
        debug!("Decider: wrong number of evaluations");
        return Ok(false);
    };

    let n = vk.domain_size;
    let d1 = domain::<G::ScalarField>(n)?;

    let mut transcript = Transcript::<F, G>::new(sponge_params);
    transcript.absorb_fields(&[vk.digest]);
    transcript.absorb_relaxed(instance);
    let beta = transcript.challenge()?;
    let gamma = transcript.challenge()?;
    transcript.absorb_points(&[proof.z_commitment]);
    let alpha = transcript.challenge()?;
    transcript.absorb_points(&proof.t_commitments);
    let zeta = transcript.challenge()?;
    let zeta_omega = zeta * d1.group_gen;
    transcript.absorb_scalars(&evals);
    transcript.absorb_scalars(&evals_omega);
    let polyscale = transcript.challenge()?;
    let evalscale = transcript.challenge()?;

    let [a, b, c, e, z, q_l, q_r, q_o, q_m, q_c, s0, s1, s2, t0, t1, t2] = evals;
    let z_omega = evals_omega[4];
    let u = instance.u;

    let lagrange = d1.evaluate_all_lagrange_coefficients(zeta);
    let public: G::ScalarField = instance
        .public_inputs
        .iter()
        .zip(lagrange.iter())
        .map(|(x, l)| -*x * l)
        .sum();
    let gate = q_m * a * b + u * (q_l * a + q_r * b + q_o * c + public) + u * u * q_c + e;

    let k = shifts::<G::ScalarField>();
    let w = [a, b, c];
    let sigma = [s0, s1, s2];
    let mut num = z;
    let mut den = z_omega;
    for j in 0..NUMBER_OF_COLUMNS {
        num *= w[j] + beta * k[j] * zeta + gamma;
        den *= w[j] + beta * sigma[j] + gamma;
    }
    let boundary = lagrange[0] * (z - G::ScalarField::one());

    let zeta_n = zeta.pow([n as u64]);
    let lhs = gate + alpha * (den - num) + alpha * alpha * boundary;
    let rhs = d1.evaluate_vanishing_polynomial(zeta) * (t0 + zeta_n * t1 + zeta_n * zeta_n * t2);
    if lhs != rhs {
        debug!("Decider: the quotient identity doesn't hold at ζ");
        return Ok(false);
    }

    let commitments: [G; NUMBER_OF_POLYNOMIALS] = [
        instance.commitments[0],
        instance.commitments[1],
        instance.commitments[2],
        instance.error_commitment,
        proof.z_commitment,
        vk.selector_commitments[0],
        vk.selector_commitments[1],
        vk.selector_commitments[2],
        vk.selector_commitments[3],
        vk.selector_commitments[4],
        vk.sigma_commitments[0],
        vk.sigma_commitments[1],
        vk.sigma_commitments[2],
        proof.t_commitments[0],
        proof.t_commitments[1],
        proof.t_commitments[2],
    ];
    let evaluations: Vec<Evaluation<G>> = commitments
        .iter()
        .zip(evals.iter().zip(evals_omega.iter()))
        .map(|(commitment, (at_zeta, at_zeta_omega))| Evaluation {
            commitment: *commitment,
            evaluations: vec![*at_zeta, *at_zeta_omega],
        })
        .collect();

    Ok(vk.ck.verify(
        d1,
        &evaluations,
        &[zeta, zeta_omega],
        polyscale,
        evalscale,
        &proof.opening,
        transcript.into_sponge(),
    ))
}
