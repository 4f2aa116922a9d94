//! Concurrency-test fixture: block for a caller-specified duration before
//! replying, so dispatcher-core's integration tests can hold a worker busy
//! long enough to observe cold-start/saturation/reuse behavior under
//! concurrent dispatch, without needing a real GPU kernel.
use std::time::{Duration, Instant};

/// Request bytes are a little-endian `u64` giving the sleep duration in
/// milliseconds. Response bytes are a little-endian `f32` of elapsed
/// seconds, matching the timing contract of the matmul payloads.
pub fn sleep(request: &[u8]) -> Vec<u8> {
    let millis = decode_millis(request);
    let start = Instant::now();
    std::thread::sleep(Duration::from_millis(millis));
    start.elapsed().as_secs_f32().to_le_bytes().to_vec()
}

fn decode_millis(request: &[u8]) -> u64 {
    request.get(0..8).and_then(|b| b.try_into().ok()).map(u64::from_le_bytes).unwrap_or(0)
}
