//! The shape of a compiled circuit and the relaxed PLONK relation.

use super::cell_index;
use crate::{error::SangriaError, Result, NUMBER_OF_COLUMNS};
use ark_ff::PrimeField;
use log::trace;
use rayon::prelude::*;
use sangria_utils::serialization::SerdeAs;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// Selectors and copy permutation of a circuit, shared by all the instances
/// of this circuit.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitStructure<F: PrimeField> {
    pub num_public: usize,
    pub num_gates: usize,
    /// `N`, the number of rows
    pub domain_size: usize,
    #[serde_as(as = "Vec<SerdeAs>")]
    pub q_l: Vec<F>,
    #[serde_as(as = "Vec<SerdeAs>")]
    pub q_r: Vec<F>,
    #[serde_as(as = "Vec<SerdeAs>")]
    pub q_o: Vec<F>,
    #[serde_as(as = "Vec<SerdeAs>")]
    pub q_m: Vec<F>,
    #[serde_as(as = "Vec<SerdeAs>")]
    pub q_c: Vec<F>,
    /// The copy permutation over the `3N` cells, see [cell_index].
    pub sigma: Vec<usize>,
}

impl<F: PrimeField> CircuitStructure<F> {
    /// `selectors` in the order `[qL, qR, qO, qM, qC]`.
    pub fn new(
        num_public: usize,
        num_gates: usize,
        domain_size: usize,
        selectors: [Vec<F>; 5],
        sigma: Vec<usize>,
    ) -> Self {
        let [q_l, q_r, q_o, q_m, q_c] = selectors;
        Self {
            num_public,
            num_gates,
            domain_size,
            q_l,
            q_r,
            q_o,
            q_m,
            q_c,
            sigma,
        }
    }

    /// In the order `[qL, qR, qO, qM, qC]`.
    pub fn selectors(&self) -> [&[F]; 5] {
        [&self.q_l, &self.q_r, &self.q_o, &self.q_m, &self.q_c]
    }

    /// `PI` at `row`: `-x[row]` on the public rows.
    pub fn public_term(&self, x: &[F], row: usize) -> F {
        if row < self.num_public {
            -x[row]
        } else {
            F::zero()
        }
    }

    /// `qL·a + qR·b + qO·c + PI`, the part of the gate scaled by `u`.
    pub fn linear_part(&self, row: usize, x: &[F], a: F, b: F, c: F) -> F {
        self.q_l[row] * a + self.q_r[row] * b + self.q_o[row] * c + self.public_term(x, row)
    }

    fn check_shape(&self, x: &[F], columns: &[Vec<F>; NUMBER_OF_COLUMNS]) -> Result<()> {
        if x.len() != self.num_public {
            return Err(SangriaError::unsatisfied(format!(
                "expected {} public inputs, got {}",
                self.num_public,
                x.len()
            )));
        }
        if columns.iter().any(|c| c.len() != self.domain_size) {
            return Err(SangriaError::unsatisfied(format!(
                "witness columns must have {} rows",
                self.domain_size
            )));
        }
        Ok(())
    }

    fn check_copy_constraints(&self, columns: &[Vec<F>; NUMBER_OF_COLUMNS]) -> Result<()> {
        let n = self.domain_size;
        let cell_value = |cell: usize| columns[cell / n][cell % n];
        let failing = (0..NUMBER_OF_COLUMNS * n)
            .into_par_iter()
            .find_first(|cell| cell_value(*cell) != cell_value(self.sigma[*cell]));
        match failing {
            Some(cell) => {
                trace!("Copy constraint broken at cell {cell}");
                Err(SangriaError::unsatisfied(format!(
                    "copy constraint broken at row {} of column {}",
                    cell % n,
                    cell / n
                )))
            }
            None => Ok(()),
        }
    }

    fn check_gates(
        &self,
        u: F,
        x: &[F],
        columns: &[Vec<F>; NUMBER_OF_COLUMNS],
        error: Option<&[F]>,
    ) -> Result<()> {
        let [a, b, c] = columns;
        let u2 = u * u;
        let failing = (0..self.domain_size).into_par_iter().find_first(|row| {
            let row = *row;
            let e = error.map_or(F::zero(), |e| e[row]);
            let value = self.q_m[row] * a[row] * b[row]
                + u * self.linear_part(row, x, a[row], b[row], c[row])
                + u2 * self.q_c[row]
                + e;
            !value.is_zero()
        });
        match failing {
            Some(row) => {
                trace!("Gate constraint broken at row {row}");
                Err(SangriaError::unsatisfied(format!(
                    "gate constraint broken at row {row}"
                )))
            }
            None => Ok(()),
        }
    }

    /// Check the plain relation: `u = 1`, no error term.
    pub fn check_plain(&self, x: &[F], columns: &[Vec<F>; NUMBER_OF_COLUMNS]) -> Result<()> {
        self.check_shape(x, columns)?;
        self.check_gates(F::one(), x, columns, None)?;
        self.check_copy_constraints(columns)
    }

    /// Check the relaxed relation.
    pub fn check_relaxed(
        &self,
        u: F,
        x: &[F],
        columns: &[Vec<F>; NUMBER_OF_COLUMNS],
        error: &[F],
    ) -> Result<()> {
        self.check_shape(x, columns)?;
        if error.len() != self.domain_size {
            return Err(SangriaError::unsatisfied(format!(
                "error vector must have {} rows",
                self.domain_size
            )));
        }
        self.check_gates(u, x, columns, Some(error))?;
        self.check_copy_constraints(columns)
    }

    /// The cross term of the fold of two relaxed pairs:
    ///
    /// ```text
    /// T = -[qM·(a1·b2 + a2·b1) + u1·lin2 + u2·lin1 + 2·u1·u2·qC]
    /// ```
    ///
    /// where `lin = qL·a + qR·b + qO·c + PI`.
    #[allow(clippy::too_many_arguments)]
    pub fn cross_term(
        &self,
        u1: F,
        x1: &[F],
        w1: &[Vec<F>; NUMBER_OF_COLUMNS],
        u2: F,
        x2: &[F],
        w2: &[Vec<F>; NUMBER_OF_COLUMNS],
    ) -> Result<Vec<F>> {
        self.check_shape(x1, w1)?;
        self.check_shape(x2, w2)?;
        let [a1, b1, c1] = w1;
        let [a2, b2, c2] = w2;
        let two_u1_u2 = u1 * u2 * F::from(2u64);
        Ok((0..self.domain_size)
            .into_par_iter()
            .map(|row| {
                let lin1 = self.linear_part(row, x1, a1[row], b1[row], c1[row]);
                let lin2 = self.linear_part(row, x2, a2[row], b2[row], c2[row]);
                -(self.q_m[row] * (a1[row] * b2[row] + a2[row] * b1[row])
                    + u1 * lin2
                    + u2 * lin1
                    + two_u1_u2 * self.q_c[row])
            })
            .collect())
    }

    /// The cell `σ(column, row)` points to.
    pub fn sigma_of(&self, column: usize, row: usize) -> usize {
        self.sigma[cell_index(self.domain_size, column, row)]
    }
}

#[cfg(test)]
mod tests {
    use crate::arithmetization::CircuitBuilder;
    use ark_ff::{One, UniformRand};
    use sangria_curves::pasta::Fq;
    use sangria_utils::tests::make_test_rng;

    fn cubic(x: u64) -> CircuitBuilder<Fq> {
        let mut b = CircuitBuilder::new();
        let x = b.alloc(Fq::from(x));
        b.public_input(x);
        let x2 = b.mul(x, x);
        let x3 = b.mul(x2, x);
        let y = b.linear_combination(&[(Fq::one(), x3), (Fq::one(), x)], Fq::from(5u64));
        b.public_input(y);
        b
    }

    #[test]
    fn cross_term_makes_folding_work() {
        let mut rng = make_test_rng(None);
        let (structure, x1, w1) = cubic(3).finalize();
        let (_, x2, w2) = cubic(7).finalize();
        let t = structure
            .cross_term(Fq::one(), &x1, &w1, Fq::one(), &x2, &w2)
            .unwrap();
        let r = Fq::rand(&mut rng);
        let fold = |v1: &[Fq], v2: &[Fq]| -> Vec<Fq> {
            v1.iter().zip(v2).map(|(a, b)| *a + r * b).collect()
        };
        let x = fold(&x1, &x2);
        let w = [fold(&w1[0], &w2[0]), fold(&w1[1], &w2[1]), fold(&w1[2], &w2[2])];
        let e: Vec<Fq> = t.iter().map(|t| r * t).collect();
        let u = Fq::one() + r;
        structure.check_relaxed(u, &x, &w, &e).unwrap();

        // without the cross term, the folded pair is not satisfied
        let zeros = vec![Fq::from(0u64); structure.domain_size];
        assert!(structure.check_relaxed(u, &x, &w, &zeros).is_err());
    }

    #[test]
    fn wrong_public_input_is_reported() {
        let (structure, mut x, w) = cubic(3).finalize();
        structure.check_plain(&x, &w).unwrap();
        x[1] += Fq::one();
        assert!(structure.check_plain(&x, &w).is_err());
        assert!(structure.check_plain(&x[..1], &w).is_err());
    }
}
