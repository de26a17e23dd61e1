//! Fixed-edge binning for derived features

/// Age bin edges. Bin 0 is `[20, 30]`; every later bin is right-closed.
pub const AGE_BIN_EDGES: [f64; 6] = [20.0, 30.0, 40.0, 50.0, 60.0, 70.0];

/// Code for a value outside every bin
pub const UNBINNED: f64 = -1.0;

/// Ordinal bin index of `value` for right-closed `edges`, with the lowest
/// edge included in the first bin. `None` when out of range or not finite.
pub fn bin_index(value: f64, edges: &[f64]) -> Option<usize> {
    if !value.is_finite() || edges.len() < 2 {
        return None;
    }
    let first = edges[0];
    let last = edges[edges.len() - 1];
    if value < first || value > last {
        return None;
    }
    edges
        .windows(2)
        .position(|w| value <= w[1])
}

/// Age_Group feature value: bin index `0..=4`, or [`UNBINNED`].
pub fn age_group(age: f64) -> f64 {
    bin_index(age, &AGE_BIN_EDGES).map_or(UNBINNED, |i| i as f64)
}
