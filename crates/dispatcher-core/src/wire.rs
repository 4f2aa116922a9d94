//! Byte-level codecs for the two wire formats this server speaks.
//!
//! - Client <-> dispatcher: a fixed 5-byte response, `u8 cold_start` then
//!   `f32` little-endian `inner_time_seconds`.
//! - Dispatcher <-> worker: the reference worker payloads reply with a
//!   single little-endian `f32` of elapsed seconds; the dispatcher itself
//!   treats worker response bytes as opaque and only re-derives a timing
//!   float for the reference payloads' sake.

/// Encode the 5-byte client-facing response.
///
/// `inner_time_seconds` is `0.0` on saturation, by construction of the
/// caller.
pub fn encode_client_response(cold_start: bool, inner_time_seconds: f32) -> [u8; 5] {
    let mut out = [0u8; 5];
    out[0] = cold_start as u8;
    out[1..5].copy_from_slice(&inner_time_seconds.to_le_bytes());
    out
}

/// Decode a little-endian `f32` out of a worker's reply bytes.
///
/// Returns `None` if `bytes` is not exactly 4 bytes long — the case where a
/// worker's entry point panicked and the worker replied with an empty frame.
/// Callers should treat `None` as inner time `0.0` while still reporting the
/// dispatch outcome as a success, since the wire protocol has no room for a
/// distinct "worker error" status.
pub fn decode_worker_time(bytes: &[u8]) -> Option<f32> {
    let arr: [u8; 4] = bytes.try_into().ok()?;
    Some(f32::from_le_bytes(arr))
}
