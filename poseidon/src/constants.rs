pub trait SpongeConstants {
    const SPONGE_CAPACITY: usize = 1;
    const SPONGE_WIDTH: usize = 3;
    const SPONGE_RATE: usize = 2;
    const PERM_ROUNDS_FULL: usize;
    const PERM_ROUNDS_PARTIAL: usize;
    const PERM_HALF_ROUNDS_FULL: usize;
    const PERM_SBOX: u32;

    /// Number of rows of round constants.
    const PERM_ROUNDS: usize = Self::PERM_ROUNDS_FULL + Self::PERM_ROUNDS_PARTIAL;
}

/// Width 3, x^5 S-box, 8 full rounds split around 56 partial rounds.
/// Used for every sponge of the folding scheme, natively and in circuits.
#[derive(Clone, Debug)]
pub struct PlonkSpongeConstants {}

impl SpongeConstants for PlonkSpongeConstants {
    const SPONGE_CAPACITY: usize = 1;
    const SPONGE_WIDTH: usize = 3;
    const SPONGE_RATE: usize = 2;
    const PERM_ROUNDS_FULL: usize = 8;
    const PERM_ROUNDS_PARTIAL: usize = 56;
    const PERM_HALF_ROUNDS_FULL: usize = 4;
    const PERM_SBOX: u32 = 5;
}
