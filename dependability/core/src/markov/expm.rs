//! Matrix exponential by scaling and squaring with Padé approximants
//!
//! Degree selection and constants follow Higham, "The Scaling and Squaring
//! Method for the Matrix Exponential Revisited" (2005), with the 1-norm.

use super::lu::solve;
use crate::error::DependabilityResult;
use log::debug;
use ndarray::{Array2, Axis};

/// Largest 1-norm for which the Padé approximant of each degree is accurate
const THETA: [(usize, f64); 4] = [
    (3, 1.495585217958292e-2),
    (5, 2.539398330063230e-1),
    (7, 9.504178996162932e-1),
    (9, 2.097847961257068),
];
const THETA_13: f64 = 5.371920351148152;

const B3: [f64; 4] = [120.0, 60.0, 12.0, 1.0];
const B5: [f64; 6] = [30240.0, 15120.0, 3360.0, 420.0, 30.0, 1.0];
const B7: [f64; 8] = [
    17297280.0, 8648640.0, 1995840.0, 277200.0, 25200.0, 1512.0, 56.0, 1.0,
];
const B9: [f64; 10] = [
    17643225600.0,
    8821612800.0,
    2075673600.0,
    302702400.0,
    30270240.0,
    2162160.0,
    110880.0,
    3960.0,
    90.0,
    1.0,
];
const B13: [f64; 14] = [
    64764752532480000.0,
    32382376266240000.0,
    7771770303897600.0,
    1187353796428800.0,
    129060195264000.0,
    10559470521600.0,
    670442572800.0,
    33522128640.0,
    1323241920.0,
    40840800.0,
    960960.0,
    16380.0,
    182.0,
    1.0,
];

/// `Σ coefficient · matrix`
fn combine(n: usize, terms: &[(f64, &Array2<f64>)]) -> Array2<f64> {
    let mut out = Array2::zeros((n, n));
    for &(coefficient, matrix) in terms {
        if coefficient != 0.0 {
            out.scaled_add(coefficient, matrix);
        }
    }
    out
}

/// Maximum absolute column sum
fn norm1(a: &Array2<f64>) -> f64 {
    a.mapv(f64::abs)
        .sum_axis(Axis(0))
        .fold(0.0, |max, &column| f64::max(max, column))
}

/// Solve `(V - U) X = V + U`
fn pade_quotient(u: &Array2<f64>, v: &Array2<f64>) -> DependabilityResult<Array2<f64>> {
    solve(&(v - u), &(v + u))
}

/// Padé approximant of degree 3, 5, 7 or 9
fn pade_low(a: &Array2<f64>, b: &[f64]) -> DependabilityResult<Array2<f64>> {
    let n = a.nrows();
    let a2 = a.dot(a);

    // Even powers I, A², A⁴, ...
    let mut powers = vec![Array2::eye(n), a2.clone()];
    while powers.len() < b.len() / 2 {
        let next = match powers.last() {
            Some(p) => p.dot(&a2),
            None => Array2::eye(n),
        };
        powers.push(next);
    }

    let odd: Vec<(f64, &Array2<f64>)> = powers
        .iter()
        .enumerate()
        .map(|(k, p)| (b[2 * k + 1], p))
        .collect();
    let even: Vec<(f64, &Array2<f64>)> = powers
        .iter()
        .enumerate()
        .map(|(k, p)| (b[2 * k], p))
        .collect();
    let u = a.dot(&combine(n, &odd));
    let v = combine(n, &even);
    pade_quotient(&u, &v)
}

fn pade_13(a: &Array2<f64>) -> DependabilityResult<Array2<f64>> {
    let n = a.nrows();
    let b = &B13;
    let identity = Array2::eye(n);
    let a2 = a.dot(a);
    let a4 = a2.dot(&a2);
    let a6 = a4.dot(&a2);

    let u_high = combine(n, &[(b[13], &a6), (b[11], &a4), (b[9], &a2)]);
    let u_low = combine(
        n,
        &[(b[7], &a6), (b[5], &a4), (b[3], &a2), (b[1], &identity)],
    );
    let u = a.dot(&(a6.dot(&u_high) + u_low));

    let v_high = combine(n, &[(b[12], &a6), (b[10], &a4), (b[8], &a2)]);
    let v_low = combine(
        n,
        &[(b[6], &a6), (b[4], &a4), (b[2], &a2), (b[0], &identity)],
    );
    let v = a6.dot(&v_high) + v_low;

    pade_quotient(&u, &v)
}

/// `exp(A)`
pub fn expm(a: &Array2<f64>) -> DependabilityResult<Array2<f64>> {
    let norm = norm1(a);

    for (degree, theta) in THETA {
        if norm <= theta {
            let b: &[f64] = match degree {
                3 => &B3,
                5 => &B5,
                7 => &B7,
                _ => &B9,
            };
            return pade_low(a, b);
        }
    }

    let squarings = if norm > THETA_13 {
        (norm / THETA_13).log2().ceil().max(0.0) as i32
    } else {
        0
    };
    debug!("expm: norm {:.3e}, {} squaring(s)", norm, squarings);

    let scale = 0.5f64.powi(squarings);
    let mut result = pade_13(&a.mapv(|x| x * scale))?;
    for _ in 0..squarings {
        result = result.dot(&result);
    }
    Ok(result)
}
