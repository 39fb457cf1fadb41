use super::{
    domain, shifts, DeciderProof, DeciderProverKey, NUMBER_OF_POLYNOMIALS, QUOTIENT_CHUNKS,
};
use crate::{
    arithmetization::{is_sat_relaxed, RelaxedInstance, RelaxedWitness},
    error::SangriaError,
    transcript::Transcript,
    Result, NUMBER_OF_COLUMNS,
};
use ark_ff::{FftField, Field, One, PrimeField, Zero};
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain as D};
use log::{debug, info};
use rand::{CryptoRng, RngCore};
use rayon::prelude::*;
use sangria_poly_commitment::{utils::inner_prod, CommitmentCurve};
use sangria_poseidon::poseidon::ArithmeticSpongeParams;
use sangria_utils::field_helpers::checked_batch_inverse;
use std::time::Instant;

/// Multiply the `i`-th coefficient by `g^i`.
fn distribute_powers<F: Field>(coeffs: &mut [F], g: F) {
    let mut power = F::one();
    for c in coeffs.iter_mut() {
        *c *= power;
        power *= g;
    }
}

/// From evaluations over `H` to evaluations over the coset `g·H4`, `H4`
/// being the domain of size `4N`.
fn coset_evaluations<F: PrimeField>(d1: D<F>, d4: D<F>, evals: &[F]) -> Vec<F> {
    let mut coeffs = d1.ifft(evals);
    distribute_powers(&mut coeffs, F::GENERATOR);
    coeffs.resize(d4.size(), F::zero());
    d4.fft(&coeffs)
}

/// The grand product of the copy permutation: `z[0] = 1` and
/// `z[i+1] = z[i]·Πⱼ(wⱼ[i] + β·kⱼ·ωⁱ + γ) / Πⱼ(wⱼ[i] + β·σⱼ[i] + γ)`.
fn permutation_aggregation<F: PrimeField>(
    d1: D<F>,
    columns: &[Vec<F>; NUMBER_OF_COLUMNS],
    sigma: &[Vec<F>; NUMBER_OF_COLUMNS],
    beta: F,
    gamma: F,
) -> Result<Vec<F>> {
    let k = shifts::<F>();
    let omegas: Vec<F> = d1.elements().collect();
    let (numerators, mut denominators): (Vec<F>, Vec<F>) = omegas
        .par_iter()
        .enumerate()
        .map(|(row, omega)| {
            let mut num = F::one();
            let mut den = F::one();
            for j in 0..NUMBER_OF_COLUMNS {
                let w = columns[j][row];
                num *= w + beta * k[j] * omega + gamma;
                den *= w + beta * sigma[j][row] + gamma;
            }
            (num, den)
        })
        .unzip();
    checked_batch_inverse(&mut denominators)?;

    let mut z = Vec::with_capacity(omegas.len());
    let mut acc = F::one();
    for (num, den_inv) in numerators.iter().zip(denominators.iter()) {
        z.push(acc);
        acc *= *num * den_inv;
    }
    if !acc.is_one() {
        return Err(SangriaError::unsatisfied(
            "the columns don't respect the copy permutation",
        ));
    }
    Ok(z)
}

/// Prove that `(instance, witness)` satisfies the relaxed relation of the
/// circuit of `pk`. The pair is checked first.
pub fn prove<F, G, R>(
    pk: &DeciderProverKey<G>,
    sponge_params: &ArithmeticSpongeParams<F>,
    instance: &RelaxedInstance<G>,
    witness: &RelaxedWitness<G::ScalarField>,
    rng: &mut R,
) -> Result<DeciderProof<G>>
where
    F: PrimeField,
    G: CommitmentCurve<BaseField = F>,
    R: RngCore + CryptoRng,
{
    let start = Instant::now();
    let vk = &pk.vk;
    let structure = &pk.structure;
    is_sat_relaxed(structure, &vk.ck, instance, witness)?;

    let n = structure.domain_size;
    let d1 = domain::<G::ScalarField>(n)?;
    let d4 = domain::<G::ScalarField>(4 * n)?;
    let k = shifts::<G::ScalarField>();
    let zero = G::ScalarField::zero();
    let one = G::ScalarField::one();
    let u = instance.u;

    let mut transcript = Transcript::<F, G>::new(sponge_params);
    transcript.absorb_fields(&[vk.digest]);
    transcript.absorb_relaxed(instance);
    let beta = transcript.challenge()?;
    let gamma = transcript.challenge()?;

    let z = permutation_aggregation(d1, &witness.columns, &pk.sigma, beta, gamma)?;
    let z_commitment = vk.ck.commit(&z, zero)?;
    transcript.absorb_points(&[z_commitment]);
    let alpha = transcript.challenge()?;

    // The quotient, over the coset g·H4
    let t_chunks: Vec<Vec<G::ScalarField>> = {
        let public: Vec<G::ScalarField> = (0..n)
            .map(|row| structure.public_term(&instance.public_inputs, row))
            .collect();
        let [a, b, c] = &witness.columns;
        let [q_l, q_r, q_o, q_m, q_c] = structure.selectors();
        let [s0, s1, s2] = &pk.sigma;
        let inputs: [&[G::ScalarField]; 14] = [
            a, b, c, &witness.error, &z, &public, q_l, q_r, q_o, q_m, q_c, s0, s1, s2,
        ];
        let evals4: Vec<Vec<G::ScalarField>> = inputs
            .par_iter()
            .map(|v| coset_evaluations(d1, d4, v))
            .collect();
        let [a4, b4, c4, e4, z4, pi4, ql4, qr4, qo4, qm4, qc4, s04, s14, s24]: [Vec<
            G::ScalarField,
        >; 14] = evals4
            .try_into()
            .map_err(|_| SangriaError::Synthesis("unexpected number of polynomials".into()))?;

        let g = G::ScalarField::GENERATOR;
        let size4 = d4.size();
        let xs: Vec<G::ScalarField> = d4.elements().map(|w| g * w).collect();
        // Z_H(x) = x^N - 1 takes 4 values on the coset
        let zh: Vec<G::ScalarField> = (0..4u64)
            .map(|m| (g * d4.group_gen.pow([m])).pow([n as u64]) - one)
            .collect();
        let mut zh_inv = zh.clone();
        checked_batch_inverse(&mut zh_inv)?;
        // L0(x) = Z_H(x) / (N·(x - 1))
        let n_field = G::ScalarField::from(n as u64);
        let mut l0_den: Vec<G::ScalarField> = xs.par_iter().map(|x| n_field * (*x - one)).collect();
        checked_batch_inverse(&mut l0_den)?;

        let u2 = u * u;
        let alpha2 = alpha * alpha;
        let t4: Vec<G::ScalarField> = (0..size4)
            .into_par_iter()
            .map(|i| {
                let w = [a4[i], b4[i], c4[i]];
                let sigma = [s04[i], s14[i], s24[i]];
                let gate = qm4[i] * w[0] * w[1]
                    + u * (ql4[i] * w[0] + qr4[i] * w[1] + qo4[i] * w[2] + pi4[i])
                    + u2 * qc4[i]
                    + e4[i];
                // z(ωx) is 4 steps further on the coset
                let mut num = z4[i];
                let mut den = z4[(i + 4) % size4];
                for j in 0..NUMBER_OF_COLUMNS {
                    num *= w[j] + beta * k[j] * xs[i] + gamma;
                    den *= w[j] + beta * sigma[j] + gamma;
                }
                let l0 = zh[i % 4] * l0_den[i];
                let boundary = l0 * (z4[i] - one);
                (gate + alpha * (den - num) + alpha2 * boundary) * zh_inv[i % 4]
            })
            .collect();

        let mut t = d4.ifft(&t4);
        let g_inv = g.inverse().ok_or(SangriaError::FieldInversionOfZero)?;
        distribute_powers(&mut t, g_inv);
        if t[QUOTIENT_CHUNKS * n..].iter().any(|c| !c.is_zero()) {
            return Err(SangriaError::unsatisfied("the quotient has too large a degree"));
        }
        t[..QUOTIENT_CHUNKS * n]
            .chunks(n)
            .map(|chunk| d1.fft(chunk))
            .collect()
    };
    let mut t_commitments = [G::zero(); QUOTIENT_CHUNKS];
    for (c, chunk) in t_commitments.iter_mut().zip(t_chunks.iter()) {
        *c = vk.ck.commit(chunk, zero)?;
    }
    transcript.absorb_points(&t_commitments);
    let zeta = transcript.challenge()?;
    let zeta_omega = zeta * d1.group_gen;

    let [q_l, q_r, q_o, q_m, q_c] = structure.selectors();
    let [s0, s1, s2] = &pk.sigma;
    let [a, b, c] = &witness.columns;
    let polynomials: [&[G::ScalarField]; NUMBER_OF_POLYNOMIALS] = [
        a,
        b,
        c,
        &witness.error,
        &z,
        q_l,
        q_r,
        q_o,
        q_m,
        q_c,
        s0,
        s1,
        s2,
        &t_chunks[0],
        &t_chunks[1],
        &t_chunks[2],
    ];
    let evaluate_at = |x: G::ScalarField| -> Vec<G::ScalarField> {
        let lagrange = d1.evaluate_all_lagrange_coefficients(x);
        polynomials
            .par_iter()
            .map(|p| inner_prod(p, &lagrange))
            .collect()
    };
    let evals_zeta = evaluate_at(zeta);
    let evals_zeta_omega = evaluate_at(zeta_omega);
    transcript.absorb_scalars(&evals_zeta);
    transcript.absorb_scalars(&evals_zeta_omega);
    let polyscale = transcript.challenge()?;
    let evalscale = transcript.challenge()?;

    let blinders = [
        witness.blinders[0],
        witness.blinders[1],
        witness.blinders[2],
        witness.error_blinder,
    ];
    let vectors: Vec<(&[G::ScalarField], G::ScalarField)> = polynomials
        .iter()
        .enumerate()
        .map(|(i, p)| (*p, blinders.get(i).copied().unwrap_or(zero)))
        .collect();
    let opening = vk.ck.open(
        d1,
        &vectors,
        &[zeta, zeta_omega],
        polyscale,
        evalscale,
        transcript.into_sponge(),
        rng,
    )?;

    debug!("Quotient of degree < {} committed", QUOTIENT_CHUNKS * n);
    info!("Decider proof over {} rows created in {:?}", n, start.elapsed());
    Ok(DeciderProof {
        z_commitment,
        t_commitments,
        evals_zeta,
        evals_zeta_omega,
        opening,
    })
}
