//! Chunked byte emission.
//!
//! Streams either zeros or a byte range from a seekable source to a sink in
//! fixed-size chunks. The metadata layer and the emitter share one file
//! handle, so [`emit_range`] leaves the source position exactly where it
//! found it, even when the copy fails partway.

use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};

/// Copy buffer size. Bounds peak memory while amortizing syscall overhead.
pub const CHUNK_LEN: usize = 64 * 1024;

/// Writes exactly `count` zero bytes to `out`.
///
/// A `count` of zero performs no I/O.
///
/// # Errors
///
/// Propagates the first write error; bytes already written stay written.
pub fn emit_zeros<W: Write>(out: &mut W, count: u64) -> io::Result<()> {
    if count == 0 {
        return Ok(());
    }
    let zeros = vec![0u8; CHUNK_LEN];
    let mut remaining = count;
    while remaining > 0 {
        let len = chunk_len(remaining);
        out.write_all(&zeros[..len])?;
        remaining -= len as u64;
    }
    Ok(())
}

/// Copies `length` bytes starting at absolute `offset` in `source` to `out`.
///
/// The source position is saved before the copy and restored afterwards; on
/// a copy failure the restore is still attempted and the copy error wins.
/// A `length` of zero performs no I/O.
///
/// # Errors
///
/// Fails with [`ErrorKind::UnexpectedEof`] if `source` ends before `length`
/// bytes were read, and propagates seek, read, and write errors.
pub fn emit_range<S, W>(source: &mut S, out: &mut W, offset: u64, length: u64) -> io::Result<()>
where
    S: Read + Seek,
    W: Write,
{
    if length == 0 {
        return Ok(());
    }
    let saved = source.stream_position()?;
    let copied = copy_range(source, out, offset, length);
    let restored = source.seek(SeekFrom::Start(saved)).map(drop);
    copied.and(restored)
}

/// The copy loop proper; position bookkeeping stays in [`emit_range`].
fn copy_range<S, W>(source: &mut S, out: &mut W, offset: u64, length: u64) -> io::Result<()>
where
    S: Read + Seek,
    W: Write,
{
    source.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; CHUNK_LEN];
    let mut remaining = length;
    while remaining > 0 {
        let want = chunk_len(remaining);
        let got = match source.read(&mut buf[..want]) {
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!("range ends {remaining} bytes past end of file"),
                ));
            }
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        out.write_all(&buf[..got])?;
        remaining -= got as u64;
    }
    Ok(())
}

/// Bytes to move in the next chunk; always fits in the copy buffer.
#[allow(clippy::cast_possible_truncation)]
fn chunk_len(remaining: u64) -> usize {
    remaining.min(CHUNK_LEN as u64) as usize
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
