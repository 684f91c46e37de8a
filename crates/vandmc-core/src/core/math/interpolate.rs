#[inline]
pub fn interpolate(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    (y2 - y1) / (x2 - x1) * (x - x1) + y1
}

/// Piecewise-linear lookup in ascending `xs`. Bins are half-open, so the last
/// abscissa itself is out of range. Returns `None` outside `[xs[0], xs[n-1])`
/// or when the slices differ in length.
pub fn interpolate_table(x: f64, xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let upper = xs.partition_point(|&v| v <= x);
    if upper == 0 || upper >= xs.len() {
        return None;
    }
    let lower = upper - 1;
    Some(interpolate(xs[lower], ys[lower], xs[upper], ys[upper], x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_is_exact_on_a_line() {
        assert!((interpolate(1.0, 2.0, 3.0, 6.0, 2.5) - 5.0).abs() < 1e-12);
        assert!((interpolate(1.0, 2.0, 3.0, 6.0, 4.0) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn interpolate_table_uses_bracketing_bin() {
        let xs = [0.0, 1.0, 3.0];
        let ys = [0.0, 10.0, 30.0];
        assert_eq!(interpolate_table(0.0, &xs, &ys), Some(0.0));
        assert!((interpolate_table(2.0, &xs, &ys).unwrap() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn interpolate_table_rejects_values_outside_half_open_range() {
        let xs = [0.0, 1.0, 3.0];
        let ys = [0.0, 10.0, 30.0];
        assert_eq!(interpolate_table(-0.1, &xs, &ys), None);
        assert_eq!(interpolate_table(3.0, &xs, &ys), None);
    }

    #[test]
    fn interpolate_table_rejects_mismatched_slices() {
        assert_eq!(interpolate_table(0.5, &[0.0, 1.0], &[0.0]), None);
    }
}
