//! Median Selection

/// Median of an ascending slice.
///
/// Odd length picks the middle element; even length averages the two middle
/// elements. Returns `None` for an empty slice.
pub fn median_of_sorted(sorted: &[f64]) -> Option<f64> {
    let k = sorted.len();
    if k == 0 {
        return None;
    }
    if k % 2 == 1 {
        // 1-indexed rank (k + 1) / 2
        Some(sorted[(k + 1) / 2 - 1])
    } else {
        let lower = sorted[k / 2 - 1];
        let upper = sorted[k / 2];
        // Halve before adding so large ranges cannot overflow to infinity
        Some(lower * 0.5 + upper * 0.5)
    }
}

/// Sort `values` ascending in place and return their median
pub(crate) fn median_in_place(values: &mut [f64]) -> Option<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    median_of_sorted(values)
}
