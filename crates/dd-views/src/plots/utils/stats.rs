//! Statistical utilities for plots

use itertools::Itertools;
use ndarray::Array2;

/// Pearson correlation over the rows where both series are present.
///
/// `NaN` when fewer than two rows pair up or either series is constant.
pub fn pearson_pairwise(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Symmetric correlation matrix of `columns`.
///
/// Only the upper triangle is computed; the diagonal is 1 for every column
/// with a defined self-correlation.
pub fn correlation_matrix(columns: &[Vec<Option<f64>>]) -> Array2<f64> {
    let n = columns.len();
    let mut matrix = Array2::from_elem((n, n), f64::NAN);

    for i in 0..n {
        if !pearson_pairwise(&columns[i], &columns[i]).is_nan() {
            matrix[[i, i]] = 1.0;
        }
        for j in (i + 1)..n {
            let r = pearson_pairwise(&columns[i], &columns[j]);
            matrix[[i, j]] = r;
            matrix[[j, i]] = r;
        }
    }

    matrix
}

/// Smallest and largest finite value, if any
pub fn finite_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .minmax()
        .into_option()
}
