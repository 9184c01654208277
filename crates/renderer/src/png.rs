//! PNG encoding for finished figures.
//!
//! Chunks are written directly over flate2 + crc32fast. Two pixel layouts:
//! - **Indexed (color type 3)** when the figure has ≤256 unique colors,
//!   which styled maps usually do. Smaller files, faster deflate.
//! - **RGBA (color type 6)** otherwise.
//!
//! Every file carries `tEXt` metadata chunks (`Software`, `Creation Time`).

use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Write;

use crate::error::{RenderError, RenderResult};

/// Maximum colors for an indexed PNG.
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels before parallel palette extraction pays off.
const PARALLEL_THRESHOLD: usize = 4096;

/// Encode RGBA pixels, choosing indexed or RGBA automatically, with
/// standard metadata chunks.
pub fn encode_auto(pixels: &[u8], width: usize, height: usize, software: &str) -> RenderResult<Vec<u8>> {
    if pixels.len() != width * height * 4 {
        return Err(RenderError::PngEncode(format!(
            "pixel buffer is {} bytes, expected {}",
            pixels.len(),
            width * height * 4
        )));
    }

    let num_pixels = width * height;
    let palette = if num_pixels >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match palette {
        Some((palette, indices)) => encode_indexed(width, height, &palette, &indices, software),
        None => encode_rgba(pixels, width, height, software),
    }
}

/// Encode as RGBA (color type 6) regardless of color count.
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize, software: &str) -> RenderResult<Vec<u8>> {
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    write_ihdr(&mut png, width, height, 6);
    write_text_chunks(&mut png, software);

    let scanlines = add_filter_bytes(pixels, width * 4, height);
    let idat = deflate(&scanlines)?;
    write_chunk(&mut png, b"IDAT", &idat);

    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode as indexed (color type 3) from a palette and per-pixel indices.
pub fn encode_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
    software: &str,
) -> RenderResult<Vec<u8>> {
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    write_ihdr(&mut png, width, height, 3);

    let mut plte = Vec::with_capacity(palette.len() * 3);
    for (r, g, b, _) in palette {
        plte.extend_from_slice(&[*r, *g, *b]);
    }
    write_chunk(&mut png, b"PLTE", &plte);

    // tRNS only when some palette entry is translucent
    if palette.iter().any(|(_, _, _, a)| *a < 255) {
        let trns: Vec<u8> = palette.iter().map(|(_, _, _, a)| *a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_text_chunks(&mut png, software);

    let scanlines = add_filter_bytes(indices, width, height);
    let idat = deflate(&scanlines)?;
    write_chunk(&mut png, b"IDAT", &idat);

    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

fn write_ihdr(png: &mut Vec<u8>, width: usize, height: usize, color_type: u8) {
    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(color_type);
    ihdr.push(0); // compression method
    ihdr.push(0); // filter method
    ihdr.push(0); // interlace method
    write_chunk(png, b"IHDR", &ihdr);
}

/// `Software` and `Creation Time` tEXt chunks.
fn write_text_chunks(png: &mut Vec<u8>, software: &str) {
    write_text_chunk(png, "Software", software);
    let stamp = chrono::Utc::now().to_rfc2822();
    write_text_chunk(png, "Creation Time", &stamp);
}

fn write_text_chunk(png: &mut Vec<u8>, keyword: &str, value: &str) {
    let mut data = Vec::with_capacity(keyword.len() + 1 + value.len());
    data.extend_from_slice(keyword.as_bytes());
    data.push(0);
    data.extend_from_slice(value.as_bytes());
    write_chunk(png, b"tEXt", &data);
}

/// Prefix each scanline with filter type 0 (none).
fn add_filter_bytes(data: &[u8], row_bytes: usize, height: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(height * (1 + row_bytes));
    for y in 0..height {
        out.push(0);
        out.extend_from_slice(&data[y * row_bytes..(y + 1) * row_bytes]);
    }
    out
}

fn deflate(data: &[u8]) -> RenderResult<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(data)
        .map_err(|e| RenderError::PngEncode(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| RenderError::PngEncode(e.to_string()))
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

// =============================================================================
// Palette extraction
// =============================================================================

/// Pack RGBA bytes into a u32 for fast hashing.
#[inline(always)]
fn pack_color(px: &[u8]) -> u32 {
    (px[0] as u32) | ((px[1] as u32) << 8) | ((px[2] as u32) << 16) | ((px[3] as u32) << 24)
}

#[inline(always)]
fn unpack_color(packed: u32) -> (u8, u8, u8, u8) {
    (
        packed as u8,
        (packed >> 8) as u8,
        (packed >> 16) as u8,
        (packed >> 24) as u8,
    )
}

/// Single-pass palette extraction for small figures. Returns None once the
/// color count exceeds the palette limit.
fn extract_palette_sequential(pixels: &[u8]) -> Option<(Vec<(u8, u8, u8, u8)>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let packed = pack_color(chunk);
        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push((chunk[0], chunk[1], chunk[2], chunk[3]));
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel palette extraction for larger figures: collect unique colors
/// per chunk, merge, then map pixels to indices in parallel.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Vec<(u8, u8, u8, u8)>, Vec<u8>)> {
    let threads = rayon::current_num_threads().max(1);
    let pixels_per_chunk = (pixels.len() / 4 / threads).max(256);
    let chunk_size = pixels_per_chunk * 4;

    let unique_colors: Vec<u32> = pixels
        .par_chunks(chunk_size)
        .flat_map(|chunk| {
            let mut local: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                local.insert(pack_color(px), ());
                if local.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            local.into_keys().collect::<Vec<_>>()
        })
        .collect();

    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    for packed in unique_colors {
        if !color_to_index.contains_key(&packed) {
            if palette.len() >= MAX_PALETTE_SIZE {
                return None;
            }
            color_to_index.insert(packed, palette.len() as u8);
            palette.push(unpack_color(packed));
        }
    }

    let mut indices = vec![0u8; pixels.len() / 4];
    indices
        .par_chunks_mut(pixels_per_chunk)
        .enumerate()
        .for_each(|(chunk_idx, out)| {
            let start = chunk_idx * pixels_per_chunk;
            for (i, idx) in out.iter_mut().enumerate() {
                let off = (start + i) * 4;
                *idx = *color_to_index
                    .get(&pack_color(&pixels[off..off + 4]))
                    .unwrap_or(&0);
            }
        });

    Some((palette, indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_types(png: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        let mut pos = 8;
        while pos + 8 <= png.len() {
            let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
            out.push(String::from_utf8_lossy(&png[pos + 4..pos + 8]).to_string());
            pos += 12 + len;
        }
        out
    }

    #[test]
    fn test_signature_and_required_chunks() {
        let pixels = vec![255u8; 4 * 4]; // 2x2 white
        let png = encode_auto(&pixels, 2, 2, "eos-plot").unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);

        let chunks = chunk_types(&png);
        assert_eq!(chunks.first().map(String::as_str), Some("IHDR"));
        assert_eq!(chunks.last().map(String::as_str), Some("IEND"));
        assert!(chunks.iter().any(|c| c == "IDAT"));
        assert!(chunks.iter().filter(|c| *c == "tEXt").count() >= 2);
    }

    #[test]
    fn test_few_colors_use_indexed() {
        // 2 colors -> indexed with PLTE
        let mut pixels = Vec::new();
        for i in 0..64 {
            if i % 2 == 0 {
                pixels.extend_from_slice(&[255, 0, 0, 255]);
            } else {
                pixels.extend_from_slice(&[0, 0, 255, 255]);
            }
        }
        let png = encode_auto(&pixels, 8, 8, "eos-plot").unwrap();
        assert!(chunk_types(&png).iter().any(|c| c == "PLTE"));
    }

    #[test]
    fn test_many_colors_fall_back_to_rgba() {
        // 300 unique colors on one row
        let mut pixels = Vec::new();
        for i in 0..300u32 {
            pixels.extend_from_slice(&[(i % 256) as u8, (i / 2 % 256) as u8, (i / 3 % 256) as u8, 255]);
        }
        let png = encode_auto(&pixels, 300, 1, "eos-plot").unwrap();
        assert!(!chunk_types(&png).iter().any(|c| c == "PLTE"));
    }

    #[test]
    fn test_transparency_gets_trns() {
        let mut pixels = vec![255, 0, 0, 255];
        pixels.extend_from_slice(&[0, 0, 0, 0]);
        let png = encode_auto(&pixels, 2, 1, "eos-plot").unwrap();
        assert!(chunk_types(&png).iter().any(|c| c == "tRNS"));
    }

    #[test]
    fn test_parallel_extraction_matches_sequential() {
        // Large enough to trigger the parallel path; limited palette
        let mut pixels = Vec::with_capacity(128 * 128 * 4);
        for y in 0..128u32 {
            for x in 0..128u32 {
                let c = (((x / 8) + (y / 8)) % 40) as u8;
                pixels.extend_from_slice(&[c * 5, 100, 200u8.wrapping_sub(c), 255]);
            }
        }
        let (pal_p, idx_p) = extract_palette_parallel(&pixels).unwrap();
        let (pal_s, idx_s) = extract_palette_sequential(&pixels).unwrap();
        assert_eq!(pal_p.len(), pal_s.len());
        assert_eq!(idx_p.len(), idx_s.len());
        // Palettes may be ordered differently; resolve indices to colors
        for (ip, is) in idx_p.iter().zip(idx_s.iter()) {
            assert_eq!(pal_p[*ip as usize], pal_s[*is as usize]);
        }
    }

    #[test]
    fn test_size_mismatch_rejected() {
        assert!(encode_auto(&[0u8; 12], 2, 2, "x").is_err());
    }
}
