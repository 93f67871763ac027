//! First principal component of a small dense matrix.
//!
//! Rows are observations (locations), columns are variables (indicators).
//! Columns are mean-centred, the sample covariance is built, and its
//! eigen-decomposition is found with cyclic Jacobi rotations. Indicator
//! counts are small (single digits), so the O(p³) sweeps are negligible.

/// Off-diagonal mass below which the Jacobi sweeps stop.
const CONVERGENCE_EPS: f64 = 1e-22;

/// Upper bound on Jacobi sweeps; real inputs converge in well under ten.
const MAX_SWEEPS: usize = 100;

/// Eigenvalues at or below this are treated as zero variance.
pub const ZERO_VARIANCE_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalComponent {
    /// Unit-length loading per column
    pub loadings: Vec<f64>,
    /// Variance along the component
    pub explained_variance: f64,
}

/// Column means.
fn column_means(rows: &[Vec<f64>], n_cols: usize) -> Vec<f64> {
    let mut means = vec![0.0; n_cols];
    for row in rows {
        for (m, v) in means.iter_mut().zip(row) {
            *m += v;
        }
    }
    let n = rows.len() as f64;
    means.iter_mut().for_each(|m| *m /= n);
    means
}

/// Sample covariance matrix (divides by n - 1). Requires at least two rows.
pub fn covariance_matrix(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n_cols = rows.first().map_or(0, Vec::len);
    let means = column_means(rows, n_cols);
    let mut cov = vec![vec![0.0; n_cols]; n_cols];

    for row in rows {
        let centred: Vec<f64> = row.iter().zip(&means).map(|(v, m)| v - m).collect();
        for i in 0..n_cols {
            for j in i..n_cols {
                cov[i][j] += centred[i] * centred[j];
            }
        }
    }

    let denom = (rows.len() - 1) as f64;
    for i in 0..n_cols {
        for j in i..n_cols {
            cov[i][j] /= denom;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}

/// Eigen-decomposition of a symmetric matrix.
/// Returns eigenvalues and the matching eigenvectors (as rows).
pub fn symmetric_eigen(matrix: &[Vec<f64>]) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = matrix.len();
    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| a[i][j] * a[i][j])
            .sum();
        if off < CONVERGENCE_EPS {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                if a[p][q] == 0.0 {
                    continue;
                }
                // Rotation angle that zeroes a[p][q]; take the smaller root.
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let (akp, akq) = (a[k][p], a[k][q]);
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let (vkp, vkq) = (v[k][p], v[k][q]);
                    v[k][p] = c * vkp - s * vkq;
                    v[k][q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let eigenvalues: Vec<f64> = (0..n).map(|i| a[i][i]).collect();
    let eigenvectors: Vec<Vec<f64>> = (0..n).map(|j| (0..n).map(|i| v[i][j]).collect()).collect();
    (eigenvalues, eigenvectors)
}

/// Leading principal component of `rows`.
///
/// Returns `None` for fewer than two rows, no columns, ragged or non-finite
/// input. A zero-variance matrix still returns a component, with
/// `explained_variance` ≈ 0; callers decide what that means.
pub fn first_principal_component(rows: &[Vec<f64>]) -> Option<PrincipalComponent> {
    let n_cols = rows.first()?.len();
    if rows.len() < 2 || n_cols == 0 {
        return None;
    }
    if rows
        .iter()
        .any(|r| r.len() != n_cols || r.iter().any(|v| !v.is_finite()))
    {
        return None;
    }

    let cov = covariance_matrix(rows);
    let (eigenvalues, eigenvectors) = symmetric_eigen(&cov);

    // Largest eigenvalue; first index wins ties.
    let mut best = 0;
    for (i, &lambda) in eigenvalues.iter().enumerate().skip(1) {
        if lambda > eigenvalues[best] {
            best = i;
        }
    }

    Some(PrincipalComponent {
        loadings: eigenvectors[best].clone(),
        explained_variance: eigenvalues[best].max(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f64], b: &[f64], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < tol, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_covariance() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 6.0]];
        let cov = covariance_matrix(&rows);
        assert_close(&cov[0], &[2.0, 4.0], 1e-12);
        assert_close(&cov[1], &[4.0, 8.0], 1e-12);
    }

    #[test]
    fn test_eigen_diagonal() {
        let (vals, vecs) = symmetric_eigen(&[vec![3.0, 0.0], vec![0.0, 1.0]]);
        assert_close(&vals, &[3.0, 1.0], 1e-12);
        assert_close(&vecs[0], &[1.0, 0.0], 1e-12);
    }

    #[test]
    fn test_eigen_reconstructs_av_equals_lambda_v() {
        let m = vec![
            vec![4.0, 1.0, 0.5],
            vec![1.0, 3.0, 0.2],
            vec![0.5, 0.2, 1.0],
        ];
        let (vals, vecs) = symmetric_eigen(&m);
        for (lambda, v) in vals.iter().zip(&vecs) {
            let av: Vec<f64> = m
                .iter()
                .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
                .collect();
            let lv: Vec<f64> = v.iter().map(|x| x * lambda).collect();
            assert_close(&av, &lv, 1e-9);
        }
    }

    #[test]
    fn test_two_rows_follow_difference_vector() {
        let rows = vec![vec![0.2, 0.3, 0.5], vec![0.8, 0.7, 0.5]];
        let pc = first_principal_component(&rows).unwrap();
        let abs: Vec<f64> = pc.loadings.iter().map(|v| v.abs()).collect();
        // direction of (0.6, 0.4, 0) normalised
        let norm = (0.36f64 + 0.16).sqrt();
        assert_close(&abs, &[0.6 / norm, 0.4 / norm, 0.0], 1e-9);
        assert!(pc.explained_variance > 0.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(first_principal_component(&[]).is_none());
        assert!(first_principal_component(&[vec![1.0, 2.0]]).is_none());
        assert!(first_principal_component(&[vec![1.0], vec![f64::NAN]]).is_none());

        let flat = first_principal_component(&[vec![0.5, 0.5], vec![0.5, 0.5]]).unwrap();
        assert!(flat.explained_variance <= ZERO_VARIANCE_EPS);
    }
}
