use ark_ff::Field;
use rayon::prelude::*;

pub fn inner_prod<F: Field>(xs: &[F], ys: &[F]) -> F {
    xs.par_iter().zip(ys).map(|(x, y)| *x * y).sum()
}

/// `[1, x, x², ..., x^{d-1}]`
pub fn pows<F: Field>(d: usize, x: F) -> Vec<F> {
    let mut acc = F::one();
    (0..d)
        .map(|_| {
            let res = acc;
            acc *= x;
            res
        })
        .collect()
}

/// The vector `s` such that, after the IPA rounds with challenges `chals`,
/// the folded generator is `<s, G>` and the folded evaluation vector is
/// `<s, b>`. Entry `i` is the product of the challenges of the rounds in which
/// `i` fell in the upper half.
pub fn b_poly_coefficients<F: Field>(chals: &[F]) -> Vec<F> {
    let mut s = Vec::with_capacity(1 << chals.len());
    s.push(F::one());
    for u in chals.iter().rev() {
        let upper: Vec<F> = s.iter().map(|x| *x * u).collect();
        s.extend(upper);
    }
    s
}

/// `Σᵢ polyscale^i Σⱼ evalscale^j evaluations[i][j]`
pub fn combined_inner_product<F: Field>(
    evaluations: &[Vec<F>],
    polyscale: F,
    evalscale: F,
) -> F {
    let mut res = F::zero();
    let mut xi_i = F::one();
    for evals in evaluations {
        let mut r_j = F::one();
        for e in evals {
            res += xi_i * r_j * e;
            r_j *= evalscale;
        }
        xi_i *= polyscale;
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::UniformRand;
    use sangria_curves::pasta::Fp;
    use sangria_utils::tests::make_test_rng;

    #[test]
    fn s_vector_matches_folding() {
        let mut rng = make_test_rng(None);
        let b: Vec<Fp> = (0..8).map(|_| Fp::rand(&mut rng)).collect();
        let chals: Vec<Fp> = (0..3).map(|_| Fp::rand(&mut rng)).collect();

        let mut folded = b.clone();
        for u in &chals {
            let n = folded.len() / 2;
            folded = (0..n).map(|i| folded[i] + *u * folded[n + i]).collect();
        }
        let s = b_poly_coefficients(&chals);
        assert_eq!(s.len(), 8);
        assert_eq!(inner_prod(&s, &b), folded[0]);
    }

    #[test]
    fn powers() {
        let x = Fp::from(3u64);
        assert_eq!(pows(4, x), vec![1u64, 3, 9, 27].into_iter().map(Fp::from).collect::<Vec<_>>());
    }
}
