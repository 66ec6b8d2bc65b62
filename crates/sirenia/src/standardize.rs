/// Value every element takes when the input has no spread (`max == min`).
pub const DEGENERATE_FALLBACK: f64 = 0.0;

/// Scales and translates `values` in place so the minimum maps to 0 and the maximum to 1.
///
/// Inputs must be finite. An empty slice is left untouched. When every element is equal there is
/// no range to divide by, and each element becomes [`DEGENERATE_FALLBACK`].
pub fn standardize(values: &mut [f64]) {
    debug_assert!(values.iter().all(|v| v.is_finite()));

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values.iter() {
        min = min.min(v);
        max = max.max(v);
    }

    if values.is_empty() {
        return;
    }

    if max <= min {
        tracing::trace!(len = values.len(), value = min, "degenerate range, using fallback");
        values.fill(DEGENERATE_FALLBACK);
        return;
    }

    let range = max - min;
    for v in values.iter_mut() {
        *v = if *v == max { 1.0 } else { (*v - min) / range };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_extremes_to_unit_interval() {
        let mut v = [3.0, -1.0, 7.0, 5.0];
        standardize(&mut v);
        assert_eq!(v, [0.5, 0.0, 1.0, 0.75]);
    }

    #[test]
    fn equal_values_take_the_fallback() {
        let mut v = [4.2; 5];
        standardize(&mut v);
        assert!(v.iter().all(|&x| x == DEGENERATE_FALLBACK));
    }

    #[test]
    fn single_value_is_degenerate() {
        let mut v = [-12.5];
        standardize(&mut v);
        assert_eq!(v, [DEGENERATE_FALLBACK]);
    }

    #[test]
    fn empty_is_a_no_op() {
        let mut v: [f64; 0] = [];
        standardize(&mut v);
    }
}
