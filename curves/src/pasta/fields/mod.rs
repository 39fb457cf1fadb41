pub mod fp;
pub use self::fp::*;

pub mod fq;
pub use self::fq::*;
