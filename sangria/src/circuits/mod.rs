//! Circuits: the step circuits the user provides, the gadgets the recursive
//! verifier is made of, and the augmented circuit itself.

pub mod augmented;
pub mod gadgets;
pub mod step;

pub use augmented::{AugmentedCircuit, AugmentedCircuitInputs, AugmentedCircuitParams};
pub use step::{CubicCircuit, FibonacciCircuit, StepCircuit, TrivialCircuit};
