pub mod pallas;
pub mod vesta;
