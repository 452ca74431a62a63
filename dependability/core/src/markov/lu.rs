//! Dense LU solves over `ndarray` matrices

use crate::error::{DependabilityError, DependabilityResult};
use ndarray::Array2;

/// Solve `a · X = rhs` by LU decomposition with partial pivoting
pub fn solve(a: &Array2<f64>, rhs: &Array2<f64>) -> DependabilityResult<Array2<f64>> {
    let n = a.nrows();
    if !a.is_square() || rhs.nrows() != n {
        return Err(DependabilityError::InvalidArgument(format!(
            "cannot solve a {:?} system against {:?}",
            a.dim(),
            rhs.dim()
        )));
    }
    let width = rhs.ncols();
    let mut lu = a.clone();
    let mut x = rhs.clone();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&p, &q| lu[[p, col]].abs().total_cmp(&lu[[q, col]].abs()))
            .unwrap_or(col);
        if lu[[pivot, col]] == 0.0 || !lu[[pivot, col]].is_finite() {
            return Err(DependabilityError::SingularMatrix);
        }
        if pivot != col {
            swap_rows(&mut lu, pivot, col);
            swap_rows(&mut x, pivot, col);
        }

        let diag = lu[[col, col]];
        for row in col + 1..n {
            let factor = lu[[row, col]] / diag;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                let v = lu[[col, k]];
                lu[[row, k]] -= factor * v;
            }
            for k in 0..width {
                let v = x[[col, k]];
                x[[row, k]] -= factor * v;
            }
        }
    }

    // Back substitution, column by column of the right-hand side.
    for row in (0..n).rev() {
        let diag = lu[[row, row]];
        for k in 0..width {
            let mut value = x[[row, k]];
            for j in row + 1..n {
                value -= lu[[row, j]] * x[[j, k]];
            }
            x[[row, k]] = value / diag;
        }
    }
    Ok(x)
}

fn swap_rows(m: &mut Array2<f64>, a: usize, b: usize) {
    for k in 0..m.ncols() {
        m.swap([a, k], [b, k]);
    }
}
