/// Smallest power of two greater than or equal to `d`, at least 2.
pub fn domain_size_for(d: usize) -> usize {
    d.max(2).next_power_of_two()
}
