//! FlateDecode (zlib) compression for content streams.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::{Compression as Level, Decompress, FlushDecompress, Status};

use crate::error::{PdfError, Result};

/// Compress data with zlib at the default level.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2 + 16), Level::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompress zlib data.
///
/// Streams that fail near the end (bad checksum, missing tail) yield the
/// output produced up to the failure; a stream that produces nothing at all
/// is an error.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::with_capacity(data.len() * 2);
    if decoder.read_to_end(&mut decompressed).is_ok() {
        return Ok(decompressed);
    }

    let recovered = decompress_corrupted(data);
    if recovered.is_empty() && !data.is_empty() {
        return Err(PdfError::Decode("invalid FlateDecode data".into()));
    }
    tracing::warn!(
        input = data.len(),
        recovered = recovered.len(),
        "recovered truncated FlateDecode stream"
    );
    Ok(recovered)
}

/// Best-effort zlib decompression for corrupted streams.
fn decompress_corrupted(data: &[u8]) -> Vec<u8> {
    let mut decoder = Decompress::new(true);
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut buf = [0u8; 4096];
    let mut i = 0usize;
    while i < data.len() {
        let before_out = decoder.total_out();
        let before_in = decoder.total_in();
        let res = decoder.decompress(&data[i..i + 1], &mut buf, FlushDecompress::None);
        let produced = (decoder.total_out() - before_out) as usize;
        if produced > 0 {
            out.extend_from_slice(&buf[..produced]);
        }
        let consumed = (decoder.total_in() - before_in) as usize;
        i += consumed.max(1);
        match res {
            Ok(Status::StreamEnd) | Err(_) => break,
            Ok(_) => {}
        }
    }
    out
}
