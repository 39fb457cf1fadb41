pub mod curves;
pub mod fields;

pub use curves::{
    pallas::{Pallas, PallasParameters, ProjectivePallas},
    vesta::{ProjectiveVesta, Vesta, VestaParameters},
};
pub use fields::{Fp, Fq};
