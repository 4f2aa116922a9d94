//! Length-prefixed message framing for the dispatcher <-> worker IPC channel.
//!
//! The worker subprocess's piped stdin (dispatcher writes, worker reads) and
//! stdout (worker writes, dispatcher reads) form two unidirectional pipes
//! standing in for one duplex channel. Each message is a `u32` little-endian
//! byte count followed by that many opaque payload bytes.

use std::io::{self, Read, Write};

/// Maximum single-message size accepted by [`read_frame`]. Guards against a
/// misbehaving peer claiming an unbounded length prefix; far above any
/// `message_size` a dispatcher would reasonably be configured with.
pub const MAX_FRAME_BYTES: u32 = 64 * 1024 * 1024;

/// Write one length-prefixed frame.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "frame payload too large for u32 length prefix")
    })?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(payload)?;
    writer.flush()
}

/// Read one length-prefixed frame.
///
/// Returns `Ok(None)` on a clean EOF before any byte of the length prefix is
/// read (the peer closed its end of the pipe) — surfaced to the dispatcher
/// side as a worker-gone signal rather than an error. An EOF in the middle
/// of a frame is a genuine `UnexpectedEof` error.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 4];
    match read_exact_or_eof(reader, &mut len_buf)? {
        false => return Ok(None),
        true => {}
    }
    let len = u32::from_le_bytes(len_buf);
    if len > MAX_FRAME_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame length {len} exceeds MAX_FRAME_BYTES"),
        ));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;
    Ok(Some(payload))
}

/// Like `Read::read_exact`, but returns `Ok(false)` instead of an error when
/// zero bytes could be read before EOF (a clean, message-boundary-aligned
/// close). A partial read followed by EOF is still `UnexpectedEof`.
fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return if filled == 0 {
                    Ok(false)
                } else {
                    Err(io::Error::new(io::ErrorKind::UnexpectedEof, "partial frame header"))
                };
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}
