//! pbzx payload unwrapping.
//!
//! From 10.10 on, installer package payloads are wrapped in Apple's chunked
//! `pbzx` container:
//!
//! ```text
//! "pbzx" | u64 flags | { u64 flags | u64 length | chunk[length] }*
//! ```
//!
//! All integers are big-endian. Chunks follow for as long as the previously
//! read flags carry bit 24. A chunk is either a complete xz stream (starts
//! with the xz magic, ends with `YZ`) or, when compression did not pay off,
//! raw cpio bytes. Unwrapping concatenates the decoded chunks.

use crate::nbi::error::{Error, Result};
use std::io::{self, Read, Write};

/// Magic at the start of every pbzx stream.
pub const PBZX_MAGIC: &[u8; 4] = b"pbzx";

/// Magic at the start of every xz stream.
pub const XZ_MAGIC: &[u8; 6] = b"\xfd7zXZ\x00";

/// Magic at the end of every xz stream.
const XZ_FOOTER: &[u8; 2] = b"YZ";

/// Flag bit announcing another chunk.
const MORE_CHUNKS: u64 = 1 << 24;

fn read_u64<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

fn truncated(e: io::Error, what: &str) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::InvalidPayload(format!("pbzx stream truncated while reading {what}"))
    } else {
        Error::IoError(e)
    }
}

/// Unwraps a pbzx stream from `reader` into `writer`.
///
/// Returns the number of decoded bytes written.
pub fn unwrap<R: Read, W: Write>(mut reader: R, writer: &mut W) -> Result<u64> {
    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .map_err(|e| truncated(e, "magic"))?;
    if &magic != PBZX_MAGIC {
        return Err(Error::InvalidPayload("not a pbzx file".into()));
    }

    let mut flags = read_u64(&mut reader).map_err(|e| truncated(e, "header flags"))?;
    let mut written = 0u64;
    let mut chunk = Vec::new();
    let mut index = 0usize;

    while flags & MORE_CHUNKS != 0 {
        flags = read_u64(&mut reader).map_err(|e| truncated(e, "chunk flags"))?;
        let length = read_u64(&mut reader).map_err(|e| truncated(e, "chunk length"))?;

        // Buffer only what the stream holds; lengths come from untrusted input.
        chunk.clear();
        let read = (&mut reader).take(length).read_to_end(&mut chunk)?;
        if read as u64 != length {
            return Err(Error::InvalidPayload(format!(
                "pbzx stream truncated while reading chunk data ({read} of {length} bytes)"
            )));
        }

        if chunk.starts_with(XZ_MAGIC) {
            if !chunk.ends_with(XZ_FOOTER) {
                return Err(Error::InvalidPayload(format!(
                    "chunk {index} footer is not an xz footer"
                )));
            }
            let mut decoder = xz2::read::XzDecoder::new(chunk.as_slice());
            written += io::copy(&mut decoder, writer)?;
        } else {
            log::debug!("pbzx chunk {} is stored uncompressed ({} bytes)", index, length);
            writer.write_all(&chunk)?;
            written += chunk.len() as u64;
        }

        index += 1;
    }

    log::debug!("Unwrapped {} pbzx chunks into {} bytes", index, written);
    Ok(written)
}
