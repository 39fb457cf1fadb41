use ark_ff::{
    fields::{MontBackend, MontConfig},
    Fp256,
};

/// Base field of Vesta, scalar field of Pallas.
#[derive(MontConfig)]
#[modulus = "28948022309329048855892746252171976963363056481941647379679742748393362948097"]
#[generator = "5"]
pub struct FqMontConfig;

pub type Fq = Fp256<MontBackend<FqMontConfig, 4>>;
