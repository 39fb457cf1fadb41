//! Building circuits: variables, gates, copy constraints and the witness
//! values, computed together.
//!
//! Every helper computes the value of its output while adding the gates
//! constraining it, so building a circuit with the actual inputs also
//! produces the witness. Hints, like inverses, never fail: a wrong hint
//! makes the relation unsatisfied, and this is caught when the witness is
//! checked.

use super::{cell_index, structure::CircuitStructure};
use crate::NUMBER_OF_COLUMNS;
use ark_ff::PrimeField;
use log::debug;
use sangria_utils::math::domain_size_for;
use std::collections::HashMap;

/// A wire of the circuit. Variables merged by [CircuitBuilder::assert_equal]
/// end up in the same cycle of the permutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(usize);

/// `qL·a + qR·b + qO·c + qM·a·b + qC`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selectors<F> {
    pub q_l: F,
    pub q_r: F,
    pub q_o: F,
    pub q_m: F,
    pub q_c: F,
}

impl<F: Copy> Selectors<F> {
    /// In the order `[qL, qR, qO, qM, qC]`.
    pub fn as_array(&self) -> [F; 5] {
        [self.q_l, self.q_r, self.q_o, self.q_m, self.q_c]
    }
}

#[derive(Clone, Debug)]
struct Gate<F> {
    wires: [Option<Variable>; NUMBER_OF_COLUMNS],
    selectors: Selectors<F>,
}

#[derive(Clone, Debug, Default)]
pub struct CircuitBuilder<F: PrimeField> {
    values: Vec<F>,
    gates: Vec<Gate<F>>,
    public: Vec<Variable>,
    // union-find forest over the variables, for the copy constraints
    parent: Vec<usize>,
    constants: HashMap<F, Variable>,
}

impl<F: PrimeField> CircuitBuilder<F> {
    pub fn new() -> Self {
        Self {
            values: vec![],
            gates: vec![],
            public: vec![],
            parent: vec![],
            constants: HashMap::new(),
        }
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    pub fn num_public(&self) -> usize {
        self.public.len()
    }

    pub fn num_variables(&self) -> usize {
        self.values.len()
    }

    /// Size of the evaluation domain: the public rows, the gates and one
    /// reserved row, rounded up to a power of two.
    pub fn domain_size(&self) -> usize {
        domain_size_for(self.public.len() + self.gates.len() + 1)
    }

    /// A new unconstrained variable holding `value`.
    pub fn alloc(&mut self, value: F) -> Variable {
        let v = Variable(self.values.len());
        self.values.push(value);
        self.parent.push(v.0);
        v
    }

    pub fn value(&self, v: Variable) -> F {
        self.values[v.0]
    }

    pub fn values(&self, vs: &[Variable]) -> Vec<F> {
        vs.iter().map(|v| self.value(*v)).collect()
    }

    pub fn gate(&mut self, wires: [Option<Variable>; NUMBER_OF_COLUMNS], selectors: Selectors<F>) {
        self.gates.push(Gate { wires, selectors });
    }

    /// A variable fixed to `c`. Constants are allocated once.
    pub fn constant(&mut self, c: F) -> Variable {
        if let Some(v) = self.constants.get(&c) {
            return *v;
        }
        let v = self.alloc(c);
        self.gate(
            [Some(v), None, None],
            Selectors {
                q_l: F::one(),
                q_c: -c,
                ..Default::default()
            },
        );
        self.constants.insert(c, v);
        v
    }

    pub fn zero(&mut self) -> Variable {
        self.constant(F::zero())
    }

    pub fn one(&mut self) -> Variable {
        self.constant(F::one())
    }

    /// Expose `v` as the next public input.
    pub fn public_input(&mut self, v: Variable) {
        self.public.push(v);
    }

    /// `Σ kᵢ·vᵢ + constant`, one gate per term after the first one.
    pub fn linear_combination(&mut self, terms: &[(F, Variable)], constant: F) -> Variable {
        match terms {
            [] => self.constant(constant),
            [(k, v)] if k.is_one() && constant.is_zero() => *v,
            [(k, v)] => {
                let out = self.alloc(*k * self.value(*v) + constant);
                self.gate(
                    [Some(*v), None, Some(out)],
                    Selectors {
                        q_l: *k,
                        q_o: -F::one(),
                        q_c: constant,
                        ..Default::default()
                    },
                );
                out
            }
            [(k0, v0), (k1, v1), rest @ ..] => {
                let mut acc =
                    self.alloc(*k0 * self.value(*v0) + *k1 * self.value(*v1) + constant);
                self.gate(
                    [Some(*v0), Some(*v1), Some(acc)],
                    Selectors {
                        q_l: *k0,
                        q_r: *k1,
                        q_o: -F::one(),
                        q_c: constant,
                        ..Default::default()
                    },
                );
                for (k, v) in rest {
                    let next = self.alloc(self.value(acc) + *k * self.value(*v));
                    self.gate(
                        [Some(acc), Some(*v), Some(next)],
                        Selectors {
                            q_l: F::one(),
                            q_r: *k,
                            q_o: -F::one(),
                            ..Default::default()
                        },
                    );
                    acc = next;
                }
                acc
            }
        }
    }

    pub fn add(&mut self, a: Variable, b: Variable) -> Variable {
        self.linear_combination(&[(F::one(), a), (F::one(), b)], F::zero())
    }

    pub fn sub(&mut self, a: Variable, b: Variable) -> Variable {
        self.linear_combination(&[(F::one(), a), (-F::one(), b)], F::zero())
    }

    pub fn add_constant(&mut self, a: Variable, c: F) -> Variable {
        self.linear_combination(&[(F::one(), a)], c)
    }

    pub fn scale(&mut self, a: Variable, k: F) -> Variable {
        self.linear_combination(&[(k, a)], F::zero())
    }

    pub fn mul(&mut self, a: Variable, b: Variable) -> Variable {
        let out = self.alloc(self.value(a) * self.value(b));
        self.gate(
            [Some(a), Some(b), Some(out)],
            Selectors {
                q_m: F::one(),
                q_o: -F::one(),
                ..Default::default()
            },
        );
        out
    }

    /// `num / den`, constrained by `out·den = num`. Only sound together with
    /// a constraint that `den` is not zero.
    pub fn div(&mut self, num: Variable, den: Variable) -> Variable {
        let inv = self.value(den).inverse().unwrap_or_else(F::zero);
        let out = self.alloc(self.value(num) * inv);
        self.gate(
            [Some(out), Some(den), Some(num)],
            Selectors {
                q_m: F::one(),
                q_o: -F::one(),
                ..Default::default()
            },
        );
        out
    }

    fn find(&self, mut v: usize) -> usize {
        while self.parent[v] != v {
            v = self.parent[v];
        }
        v
    }

    /// Copy constraint between `a` and `b`.
    pub fn assert_equal(&mut self, a: Variable, b: Variable) {
        let (ra, rb) = (self.find(a.0), self.find(b.0));
        if ra != rb {
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
            // shortcut the paths walked above
            self.parent[a.0] = root;
            self.parent[b.0] = root;
        }
    }

    /// `a - b = 0` as a gate. Unlike [Self::assert_equal], it binds
    /// variables that no other gate uses.
    pub fn enforce_equal(&mut self, a: Variable, b: Variable) {
        self.gate(
            [Some(a), Some(b), None],
            Selectors {
                q_l: F::one(),
                q_r: -F::one(),
                ..Default::default()
            },
        );
    }

    pub fn assert_zero(&mut self, a: Variable) {
        self.gate(
            [Some(a), None, None],
            Selectors {
                q_l: F::one(),
                ..Default::default()
            },
        );
    }

    /// `a·a - a = 0`
    pub fn assert_boolean(&mut self, a: Variable) {
        self.gate(
            [Some(a), Some(a), None],
            Selectors {
                q_l: -F::one(),
                q_m: F::one(),
                ..Default::default()
            },
        );
    }

    /// `a·cond - a = 0`: `a` is zero unless the boolean `cond` is set.
    pub fn assert_zero_unless(&mut self, cond: Variable, a: Variable) {
        self.gate(
            [Some(a), Some(cond), None],
            Selectors {
                q_l: -F::one(),
                q_m: F::one(),
                ..Default::default()
            },
        );
    }

    /// `a·a⁻¹ = 1`
    pub fn assert_nonzero(&mut self, a: Variable) {
        let inv = self.alloc(self.value(a).inverse().unwrap_or_else(F::zero));
        self.gate(
            [Some(a), Some(inv), None],
            Selectors {
                q_m: F::one(),
                q_c: -F::one(),
                ..Default::default()
            },
        );
    }

    /// `t` if the boolean `cond` is set, `f` otherwise.
    pub fn select(&mut self, cond: Variable, t: Variable, f: Variable) -> Variable {
        let diff = self.sub(t, f);
        let m = self.mul(cond, diff);
        self.add(f, m)
    }

    /// A boolean variable set iff `a` is zero.
    pub fn is_zero(&mut self, a: Variable) -> Variable {
        let inv = self.alloc(self.value(a).inverse().unwrap_or_else(F::zero));
        let out = self.alloc(if self.value(a).is_zero() {
            F::one()
        } else {
            F::zero()
        });
        // a·inv + out - 1 = 0
        self.gate(
            [Some(a), Some(inv), Some(out)],
            Selectors {
                q_o: F::one(),
                q_m: F::one(),
                q_c: -F::one(),
                ..Default::default()
            },
        );
        // a·out = 0
        self.gate(
            [Some(a), Some(out), None],
            Selectors {
                q_m: F::one(),
                ..Default::default()
            },
        );
        out
    }

    pub fn is_equal(&mut self, a: Variable, b: Variable) -> Variable {
        let diff = self.sub(a, b);
        self.is_zero(diff)
    }

    /// The wires and selectors of every row: public rows, then the gates.
    fn rows(
        &self,
    ) -> impl Iterator<Item = ([Option<Variable>; NUMBER_OF_COLUMNS], Selectors<F>)> + '_ {
        let public = self.public.iter().map(|v| {
            (
                [Some(*v), None, None],
                Selectors {
                    q_l: F::one(),
                    ..Default::default()
                },
            )
        });
        public.chain(self.gates.iter().map(|g| (g.wires, g.selectors)))
    }

    /// The shape of the circuit: selectors and the copy permutation.
    pub fn to_structure(&self) -> CircuitStructure<F> {
        let n = self.domain_size();
        let mut selectors: [Vec<F>; 5] = std::array::from_fn(|_| vec![F::zero(); n]);
        let mut cycles: HashMap<usize, Vec<usize>> = HashMap::new();
        for (row, (wires, sel)) in self.rows().enumerate() {
            for (q, value) in selectors.iter_mut().zip(sel.as_array()) {
                q[row] = value;
            }
            for (column, wire) in wires.iter().enumerate() {
                if let Some(v) = wire {
                    cycles
                        .entry(self.find(v.0))
                        .or_default()
                        .push(cell_index(n, column, row));
                }
            }
        }

        let mut sigma: Vec<usize> = (0..NUMBER_OF_COLUMNS * n).collect();
        for cells in cycles.values() {
            for (k, cell) in cells.iter().enumerate() {
                sigma[*cell] = cells[(k + 1) % cells.len()];
            }
        }

        debug!(
            "Circuit with {} public inputs, {} gates, {} variables, domain of size {}",
            self.public.len(),
            self.gates.len(),
            self.values.len(),
            n
        );
        CircuitStructure::new(self.public.len(), self.gates.len(), n, selectors, sigma)
    }

    /// The public inputs and the three columns of the witness.
    pub fn to_witness(&self) -> (Vec<F>, [Vec<F>; NUMBER_OF_COLUMNS]) {
        let n = self.domain_size();
        let mut columns: [Vec<F>; NUMBER_OF_COLUMNS] = std::array::from_fn(|_| vec![F::zero(); n]);
        for (row, (wires, _)) in self.rows().enumerate() {
            for (column, wire) in wires.iter().enumerate() {
                if let Some(v) = wire {
                    columns[column][row] = self.value(*v);
                }
            }
        }
        (self.values(&self.public), columns)
    }

    pub fn finalize(&self) -> (CircuitStructure<F>, Vec<F>, [Vec<F>; NUMBER_OF_COLUMNS]) {
        let (x, columns) = self.to_witness();
        (self.to_structure(), x, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SangriaError;
    use ark_ff::{One, Zero};
    use sangria_curves::pasta::Fp;

    fn check(b: &CircuitBuilder<Fp>) -> crate::Result<()> {
        let (structure, x, columns) = b.finalize();
        structure.check_plain(&x, &columns)
    }

    #[test]
    fn arithmetic_helpers_are_satisfied() {
        let mut b = CircuitBuilder::<Fp>::new();
        let x = b.alloc(Fp::from(3u64));
        let y = b.alloc(Fp::from(5u64));
        let s = b.add(x, y);
        let p = b.mul(s, x);
        let q = b.div(p, y);
        let l = b.linear_combination(
            &[(Fp::from(2u64), x), (Fp::from(3u64), y), (-Fp::one(), p)],
            Fp::from(7u64),
        );
        assert_eq!(b.value(s), Fp::from(8u64));
        assert_eq!(b.value(p), Fp::from(24u64));
        assert_eq!(b.value(q) * Fp::from(5u64), Fp::from(24u64));
        assert_eq!(b.value(l), Fp::from(6u64 + 15 + 7) - Fp::from(24u64));
        b.public_input(l);
        assert!(check(&b).is_ok());
    }

    #[test]
    fn constants_are_shared() {
        let mut b = CircuitBuilder::<Fp>::new();
        let c1 = b.constant(Fp::from(42u64));
        let c2 = b.constant(Fp::from(42u64));
        assert_eq!(c1, c2);
        assert_eq!(b.num_gates(), 1);
    }

    #[test]
    fn is_zero_and_select() {
        let mut b = CircuitBuilder::<Fp>::new();
        let zero = b.alloc(Fp::zero());
        let five = b.alloc(Fp::from(5u64));
        let z = b.is_zero(zero);
        let nz = b.is_zero(five);
        assert_eq!(b.value(z), Fp::one());
        assert_eq!(b.value(nz), Fp::zero());
        let s1 = b.select(z, five, zero);
        let s2 = b.select(nz, five, zero);
        assert_eq!(b.value(s1), Fp::from(5u64));
        assert_eq!(b.value(s2), Fp::zero());
        b.assert_boolean(z);
        b.assert_nonzero(five);
        assert!(check(&b).is_ok());
    }

    #[test]
    fn broken_copy_constraint_is_reported() {
        let mut b = CircuitBuilder::<Fp>::new();
        let x = b.alloc(Fp::from(3u64));
        let y = b.alloc(Fp::from(4u64));
        let s = b.add(x, y);
        let t = b.alloc(Fp::from(8u64));
        b.assert_equal(s, t);
        b.public_input(t);
        assert!(matches!(
            check(&b),
            Err(SangriaError::UnsatisfiedRelation { .. })
        ));
    }

    #[test]
    fn equality_gate_binds_unused_variables() {
        // a copy constraint with a variable that sits in no cell is void
        let mut b = CircuitBuilder::<Fp>::new();
        let x = b.alloc(Fp::from(3u64));
        let s = b.add_constant(x, Fp::one());
        let free = b.alloc(Fp::from(7u64));
        b.assert_equal(s, free);
        assert!(check(&b).is_ok());

        let mut b = CircuitBuilder::<Fp>::new();
        let x = b.alloc(Fp::from(3u64));
        let s = b.add_constant(x, Fp::one());
        let free = b.alloc(Fp::from(7u64));
        b.enforce_equal(s, free);
        assert!(matches!(
            check(&b),
            Err(SangriaError::UnsatisfiedRelation { .. })
        ));

        let mut b = CircuitBuilder::<Fp>::new();
        let x = b.alloc(Fp::from(3u64));
        let s = b.add_constant(x, Fp::one());
        let free = b.alloc(Fp::from(4u64));
        b.enforce_equal(s, free);
        assert!(check(&b).is_ok());
    }

    #[test]
    fn broken_gate_is_reported() {
        let mut b = CircuitBuilder::<Fp>::new();
        let x = b.alloc(Fp::from(2u64));
        b.assert_boolean(x);
        assert!(matches!(
            check(&b),
            Err(SangriaError::UnsatisfiedRelation { .. })
        ));
        let mut b = CircuitBuilder::<Fp>::new();
        let x = b.alloc(Fp::zero());
        b.assert_nonzero(x);
        assert!(check(&b).is_err());
    }

    #[test]
    fn layout_leaves_a_reserved_row() {
        let mut b = CircuitBuilder::<Fp>::new();
        let x = b.alloc(Fp::from(3u64));
        b.public_input(x);
        let _ = b.mul(x, x);
        let _ = b.mul(x, x);
        // 1 public row + 2 gates + 1 reserved row
        assert_eq!(b.domain_size(), 4);
        let _ = b.mul(x, x);
        assert_eq!(b.domain_size(), 8);
        let structure = b.to_structure();
        assert_eq!(structure.num_public, 1);
        assert_eq!(structure.num_gates, 3);
        assert!(structure.q_m[4..].iter().all(|q| q.is_zero()));
    }
}
