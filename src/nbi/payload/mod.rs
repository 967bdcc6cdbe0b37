//! Installer package payloads.
//!
//! A flat package's `Payload` is a cpio archive, compressed differently
//! depending on the OS release that shipped it: gzip up to 10.9, Apple's
//! `pbzx` chunked xz from 10.10 on. The format is recognised by its leading
//! bytes and decoded to a plain cpio archive before extraction.

pub mod cpio;
pub mod pbzx;

use crate::nbi::error::{Context, Error, ErrorExt, Result};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

pub use cpio::{EntryMatcher, ExtractOptions, ExtractStats, extract_matching};

/// Compression wrapped around a payload's cpio archive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadFormat {
    Pbzx,
    Xz,
    Gzip,
    /// Uncompressed cpio
    Raw,
}

impl PayloadFormat {
    /// Recognises the format from the first bytes of a payload.
    pub fn detect(header: &[u8]) -> Self {
        if header.starts_with(pbzx::PBZX_MAGIC) {
            Self::Pbzx
        } else if header.starts_with(pbzx::XZ_MAGIC) {
            Self::Xz
        } else if header.starts_with(&[0x1f, 0x8b]) {
            Self::Gzip
        } else {
            Self::Raw
        }
    }
}

fn read_header(path: &Path) -> Result<Vec<u8>> {
    let mut header = Vec::with_capacity(8);
    std::fs::File::open(path)
        .fs_context("opening payload", path)?
        .take(8)
        .read_to_end(&mut header)
        .fs_context("reading payload", path)?;
    Ok(header)
}

/// Decodes `payload` into a plain cpio archive at `output`.
///
/// Returns the detected format.
pub fn decode_to_cpio(payload: &Path, output: &Path) -> Result<PayloadFormat> {
    let format = PayloadFormat::detect(&read_header(payload)?);
    log::debug!("{} is a {:?} payload", payload.display(), format);

    let input = BufReader::new(std::fs::File::open(payload).fs_context("opening payload", payload)?);
    let mut writer =
        BufWriter::new(std::fs::File::create(output).fs_context("creating", output)?);

    match format {
        PayloadFormat::Pbzx => {
            pbzx::unwrap(input, &mut writer)
                .with_context(|| format!("unwrapping {}", payload.display()))?;
        }
        PayloadFormat::Xz => {
            io::copy(&mut xz2::read::XzDecoder::new(input), &mut writer)
                .map_err(Error::from)
                .with_context(|| format!("decompressing {}", payload.display()))?;
        }
        PayloadFormat::Gzip => {
            io::copy(&mut flate2::read::GzDecoder::new(input), &mut writer)
                .map_err(Error::from)
                .with_context(|| format!("decompressing {}", payload.display()))?;
        }
        PayloadFormat::Raw => {
            let mut input = input;
            io::copy(&mut input, &mut writer).fs_context("copying payload", payload)?;
        }
    }

    writer.flush().fs_context("writing", output)?;
    Ok(format)
}

/// Runs [`decode_to_cpio`] on the blocking thread pool.
pub async fn decode_payload(payload: &Path, output: &Path) -> Result<PayloadFormat> {
    let payload = payload.to_path_buf();
    let output = output.to_path_buf();

    tokio::task::spawn_blocking(move || decode_to_cpio(&payload, &output))
        .await
        .map_err(|e| Error::GenericError(format!("payload decoding task failed: {e}")))?
}

/// Extracts the entries of the cpio `archive` selected by `patterns` into `dest`.
pub async fn extract_archive(
    archive: &Path,
    dest: &Path,
    patterns: &[&str],
    options: ExtractOptions,
) -> Result<ExtractStats> {
    let matcher = EntryMatcher::new(patterns)?;
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<ExtractStats> {
        let file = std::fs::File::open(&archive).fs_context("opening", &archive)?;
        extract_matching(BufReader::new(file), &dest, &matcher, &options)
            .with_context(|| format!("extracting {}", archive.display()))
    })
    .await
    .map_err(|e| Error::GenericError(format!("payload extraction task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nbi::payload::{cpio::tests::odc, pbzx::tests::{pbzx, xz}};
    use std::io::Write as _;

    const PY_FILE: u32 = 0o100644;

    fn archive() -> Vec<u8> {
        odc(&[
            ("./usr/bin/pydoc", PY_FILE, b"doc"),
            ("./usr/bin/ls", PY_FILE, b"ls"),
        ])
    }

    #[test]
    fn detection_uses_magic_bytes() {
        assert_eq!(PayloadFormat::detect(b"pbzx\0\0\0\0"), PayloadFormat::Pbzx);
        assert_eq!(PayloadFormat::detect(b"\xfd7zXZ\0\0\x04"), PayloadFormat::Xz);
        assert_eq!(PayloadFormat::detect(&[0x1f, 0x8b, 8, 0]), PayloadFormat::Gzip);
        assert_eq!(PayloadFormat::detect(b"070707"), PayloadFormat::Raw);
        assert_eq!(PayloadFormat::detect(b""), PayloadFormat::Raw);
    }

    fn decode(bytes: &[u8]) -> (PayloadFormat, Vec<u8>) {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("Payload");
        let output = dir.path().join("Payload.cpio");
        std::fs::write(&payload, bytes).unwrap();
        let format = decode_to_cpio(&payload, &output).unwrap();
        (format, std::fs::read(output).unwrap())
    }

    #[test]
    fn gzip_payload_decodes() {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&archive()).unwrap();
        let (format, cpio) = decode(&encoder.finish().unwrap());
        assert_eq!(format, PayloadFormat::Gzip);
        assert_eq!(cpio, archive());
    }

    #[test]
    fn pbzx_payload_decodes() {
        let data = archive();
        let (head, tail) = data.split_at(40);
        let (format, cpio) = decode(&pbzx(&[(head, true), (tail, false)]));
        assert_eq!(format, PayloadFormat::Pbzx);
        assert_eq!(cpio, data);
    }

    #[test]
    fn xz_and_raw_payloads_decode() {
        assert_eq!(decode(&xz(&archive())), (PayloadFormat::Xz, archive()));
        assert_eq!(decode(&archive()), (PayloadFormat::Raw, archive()));
    }

    #[tokio::test]
    async fn decoded_archive_extracts_selected_entries() {
        let dir = tempfile::tempdir().unwrap();
        let payload = dir.path().join("Payload");
        let cpio = dir.path().join("Payload-BSD.cpio");
        let dest = dir.path().join("volume");
        std::fs::write(&payload, pbzx(&[(&archive(), true)])).unwrap();

        let format = decode_payload(&payload, &cpio).await.unwrap();
        assert_eq!(format, PayloadFormat::Pbzx);

        let stats = extract_archive(&cpio, &dest, &["*py*"], ExtractOptions::default())
            .await
            .unwrap();

        assert_eq!(stats.files, 1);
        assert!(dest.join("usr/bin/pydoc").exists());
        assert!(!dest.join("usr/bin/ls").exists());
    }
}
