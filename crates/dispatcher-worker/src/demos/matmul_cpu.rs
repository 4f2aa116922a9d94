//! Pure-Rust port of the CPU reference kernel's timing contract: generate a
//! deterministic `N x N` matrix, multiply it by itself, and report the
//! elapsed wall-clock time as a little-endian `f32`. The CUDA/Numba kernel
//! and shared-memory tiling of the original device-bound version are not
//! reproduced here — only the `bytes -> bytes` timing contract survives.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Request bytes are a little-endian `u32` giving the matrix dimension `N`.
/// Response bytes are a little-endian `f32` of elapsed seconds.
pub fn matmul_cpu(request: &[u8]) -> Vec<u8> {
    let n = decode_dimension(request);
    let a = random_square_matrix(n);

    let start = Instant::now();
    let product = square(&a, n);
    let elapsed = start.elapsed().as_secs_f32();

    std::hint::black_box(&product);
    elapsed.to_le_bytes().to_vec()
}

fn decode_dimension(request: &[u8]) -> usize {
    request
        .get(0..4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .unwrap_or(0) as usize
}

/// Deterministic seed, matching the reference's `np.random.default_rng(0)`:
/// the same dimension always produces the same matrix, so repeated calls at
/// a given `N` are directly comparable.
fn random_square_matrix(n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(0);
    (0..n * n).map(|_| rng.gen::<f64>()).collect()
}

/// `C = A * A`, flattened row-major, the same triple-nested loop the
/// reference's `@numba.jit` function compiles to.
fn square(a: &[f64], n: usize) -> Vec<f64> {
    let mut c = vec![0.0f64; n * n];
    for i in 0..n {
        for j in 0..n {
            let mut acc = 0.0;
            for k in 0..n {
                acc += a[i * n + k] * a[k * n + j];
            }
            c[i * n + j] = acc;
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_dimension_roundtrip() {
        let bytes = 8u32.to_le_bytes();
        assert_eq!(decode_dimension(&bytes), 8);
    }

    #[test]
    fn test_decode_dimension_short_input_is_zero() {
        assert_eq!(decode_dimension(&[1, 2]), 0);
    }

    #[test]
    fn test_matmul_cpu_response_is_four_bytes() {
        let request = 4u32.to_le_bytes();
        let response = matmul_cpu(&request);
        assert_eq!(response.len(), 4);
    }

    #[test]
    fn test_matmul_cpu_elapsed_time_is_non_negative_finite() {
        let request = 16u32.to_le_bytes();
        let response = matmul_cpu(&request);
        let elapsed = f32::from_le_bytes(response.try_into().unwrap());
        assert!(elapsed.is_finite());
        assert!(elapsed >= 0.0);
    }

    #[test]
    fn test_square_matches_naive_two_by_two() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let c = square(&a, 2);
        assert_eq!(c, vec![7.0, 10.0, 15.0, 22.0]);
    }
}
