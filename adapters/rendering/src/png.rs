//! Minimal PNG writer for opaque 8-bit RGBA surfaces.
//!
//! Layout: `[signature][IHDR][IDAT][IEND]`, every scanline prefixed with
//! filter type 0. No ancillary chunks are written, so encoding the same
//! pixels always yields the same bytes.

use std::io::Write;

use flate2::{write::ZlibEncoder, Compression};

use crate::RenderError;

const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
const BIT_DEPTH: u8 = 8;
const COLOR_TYPE_RGBA: u8 = 6;
const BYTES_PER_PIXEL: usize = 4;
const FILTER_NONE: u8 = 0;

pub(crate) fn encode_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, RenderError> {
    let stride = width as usize * BYTES_PER_PIXEL;
    if stride == 0 || rgba.len() != stride * height as usize {
        return Err(RenderError::SurfaceUnavailable { width, height });
    }

    let mut header = Vec::with_capacity(13);
    header.extend_from_slice(&width.to_be_bytes());
    header.extend_from_slice(&height.to_be_bytes());
    // compression, filter method and interlace are all zero
    header.extend_from_slice(&[BIT_DEPTH, COLOR_TYPE_RGBA, 0, 0, 0]);

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    for row in rgba.chunks_exact(stride) {
        encoder
            .write_all(&[FILTER_NONE])
            .map_err(RenderError::Encoding)?;
        encoder.write_all(row).map_err(RenderError::Encoding)?;
    }
    let compressed = encoder.finish().map_err(RenderError::Encoding)?;

    let mut png = Vec::with_capacity(SIGNATURE.len() + compressed.len() + 3 * 12 + header.len());
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, *b"IHDR", &header);
    write_chunk(&mut png, *b"IDAT", &compressed);
    write_chunk(&mut png, *b"IEND", &[]);
    Ok(png)
}

/// Appends `[length:4][type:4][data:N][crc32(type ++ data):4]`.
fn write_chunk(out: &mut Vec<u8>, kind: [u8; 4], data: &[u8]) {
    let length = u32::try_from(data.len()).unwrap_or(u32::MAX);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(&kind);
    out.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&kind);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn chunk_at(png: &[u8], offset: usize) -> (u32, [u8; 4], &[u8]) {
        let length = u32::from_be_bytes(png[offset..offset + 4].try_into().expect("length"));
        let kind: [u8; 4] = png[offset + 4..offset + 8].try_into().expect("kind");
        let data = &png[offset + 8..offset + 8 + length as usize];
        (length, kind, data)
    }

    #[test]
    fn writes_signature_and_header() {
        let png = encode_rgba(2, 1, &[1, 2, 3, 255, 4, 5, 6, 255]).expect("encode");
        assert_eq!(&png[..8], &SIGNATURE);

        let (length, kind, data) = chunk_at(&png, 8);
        assert_eq!(length, 13);
        assert_eq!(&kind, b"IHDR");
        assert_eq!(&data[..8], &[0, 0, 0, 2, 0, 0, 0, 1]);
        assert_eq!(&data[8..], &[8, 6, 0, 0, 0]);
        assert_eq!(&png[png.len() - 12..png.len() - 4], b"\0\0\0\0IEND");
    }

    #[test]
    fn chunk_crc_matches_reference_value() {
        let png = encode_rgba(1, 1, &[0, 0, 0, 255]).expect("encode");
        // CRC-32 of the bare "IEND" chunk type is fixed by the format.
        assert_eq!(&png[png.len() - 4..], &[0xae, 0x42, 0x60, 0x82]);
    }

    #[test]
    fn image_data_inflates_to_filtered_scanlines() {
        let pixels = [9, 8, 7, 255, 6, 5, 4, 255, 3, 2, 1, 255, 0, 0, 0, 255];
        let png = encode_rgba(2, 2, &pixels).expect("encode");
        let (_, kind, data) = chunk_at(&png, 8 + 12 + 13);
        assert_eq!(&kind, b"IDAT");

        let mut inflated = Vec::new();
        let _ = ZlibDecoder::new(data)
            .read_to_end(&mut inflated)
            .expect("inflate");
        assert_eq!(
            inflated,
            vec![0, 9, 8, 7, 255, 6, 5, 4, 255, 0, 3, 2, 1, 255, 0, 0, 0, 255]
        );
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        assert!(encode_rgba(3, 3, &[0; 8]).is_err());
    }
}
