//! The step function `F` of the incrementally verifiable computation.

use crate::{arithmetization::{CircuitBuilder, Variable}, Result};
use ark_ff::PrimeField;
use std::fmt::Debug;

/// One step of the computation, `z_{i+1} = F(z_i)`, given as a circuit.
///
/// The circuit must have the same shape whatever the values of `z`:
/// the public parameters are built from one synthesis with dummy inputs.
pub trait StepCircuit<F: PrimeField>: Clone + Debug + Send + Sync {
    /// The name of this circuit for identification and debugging.
    const NAME: &'static str;

    /// Number of elements of the state `z`.
    fn arity(&self) -> usize;

    /// Add the gates computing the next state from the variables `z`, and
    /// return the variables of the next state.
    fn synthesize(&self, builder: &mut CircuitBuilder<F>, z: &[Variable]) -> Result<Vec<Variable>>;

    /// Compute the output of a step directly.
    fn output(&self, z: &[F]) -> Vec<F>;
}

/// Passes its input through unchanged. Used as the step of the secondary
/// circuit.
#[derive(Clone, Debug, Default)]
pub struct TrivialCircuit<F> {
    _marker: std::marker::PhantomData<F>,
}

impl<F: PrimeField> TrivialCircuit<F> {
    pub fn new() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<F: PrimeField> StepCircuit<F> for TrivialCircuit<F> {
    const NAME: &'static str = "TrivialCircuit";

    fn arity(&self) -> usize {
        1
    }

    fn synthesize(&self, _builder: &mut CircuitBuilder<F>, z: &[Variable]) -> Result<Vec<Variable>> {
        Ok(z.to_vec())
    }

    fn output(&self, z: &[F]) -> Vec<F> {
        z.to_vec()
    }
}

/// `x -> x^3 + x + 5`
#[derive(Clone, Debug, Default)]
pub struct CubicCircuit<F> {
    _marker: std::marker::PhantomData<F>,
}

impl<F: PrimeField> CubicCircuit<F> {
    pub fn new() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<F: PrimeField> StepCircuit<F> for CubicCircuit<F> {
    const NAME: &'static str = "CubicCircuit";

    fn arity(&self) -> usize {
        1
    }

    fn synthesize(&self, builder: &mut CircuitBuilder<F>, z: &[Variable]) -> Result<Vec<Variable>> {
        let x = z[0];
        let x_sq = builder.mul(x, x);
        let x_cu = builder.mul(x_sq, x);
        let y = builder.linear_combination(&[(F::one(), x_cu), (F::one(), x)], F::from(5u64));
        Ok(vec![y])
    }

    fn output(&self, z: &[F]) -> Vec<F> {
        let x = z[0];
        vec![x * x * x + x + F::from(5u64)]
    }
}

/// `(a, b) -> (b, a + b)`, repeated `iterations` times per step.
#[derive(Clone, Debug)]
pub struct FibonacciCircuit<F> {
    iterations: usize,
    _marker: std::marker::PhantomData<F>,
}

impl<F: PrimeField> FibonacciCircuit<F> {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<F: PrimeField> Default for FibonacciCircuit<F> {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<F: PrimeField> StepCircuit<F> for FibonacciCircuit<F> {
    const NAME: &'static str = "FibonacciCircuit";

    fn arity(&self) -> usize {
        2
    }

    fn synthesize(&self, builder: &mut CircuitBuilder<F>, z: &[Variable]) -> Result<Vec<Variable>> {
        let (mut a, mut b) = (z[0], z[1]);
        for _ in 0..self.iterations {
            let next = builder.add(a, b);
            a = b;
            b = next;
        }
        Ok(vec![a, b])
    }

    fn output(&self, z: &[F]) -> Vec<F> {
        let (mut a, mut b) = (z[0], z[1]);
        for _ in 0..self.iterations {
            (a, b) = (b, a + b);
        }
        vec![a, b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sangria_curves::pasta::Fq;

    fn synthesized_output<C: StepCircuit<Fq>>(circuit: &C, z: &[Fq]) -> Vec<Fq> {
        let mut builder = CircuitBuilder::new();
        let vars: Vec<Variable> = z.iter().map(|x| builder.alloc(*x)).collect();
        let out = circuit.synthesize(&mut builder, &vars).unwrap();
        let (structure, x, columns) = builder.finalize();
        structure.check_plain(&x, &columns).unwrap();
        builder.values(&out)
    }

    #[test]
    fn synthesis_matches_output() {
        let z = [Fq::from(3u64)];
        let cubic = CubicCircuit::<Fq>::new();
        assert_eq!(cubic.output(&z), vec![Fq::from(35u64)]);
        assert_eq!(synthesized_output(&cubic, &z), cubic.output(&z));

        let trivial = TrivialCircuit::<Fq>::new();
        assert_eq!(synthesized_output(&trivial, &z), z.to_vec());

        let fib = FibonacciCircuit::<Fq>::new(5);
        let z = [Fq::from(0u64), Fq::from(1u64)];
        assert_eq!(fib.output(&z), vec![Fq::from(5u64), Fq::from(8u64)]);
        assert_eq!(synthesized_output(&fib, &z), fib.output(&z));
    }
}
