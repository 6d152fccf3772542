// SPDX-License-Identifier: GPL-3.0-only

//! Two-plane YUV 4:2:0 to RGBA conversion
//!
//! Uses BT.601 limited-range coefficients in 7-bit fixed point. Each chroma
//! pair is shared by the 2x2 block of luma samples it covers. Buffers holding
//! only the luma plane are decoded with neutral chroma, which yields gray.

use crate::constants::{NEUTRAL_CHROMA, RGBA_BYTES_PER_PIXEL, bt601};
use crate::errors::PipelineResult;
use crate::media::frame::{ColorBuffer, FrameLayout, RawFrame};
use tracing::trace;

/// Decode a raw frame into a packed RGBA buffer.
///
/// Fails with `BufferSizeMismatch` before touching any pixel when the buffer
/// length matches neither the two-plane layout nor, if allowed, a bare luma plane.
pub fn decode_frame(frame: &RawFrame<'_>, allow_luma_only: bool) -> PipelineResult<ColorBuffer> {
    let dims = frame.dimensions;
    let layout = FrameLayout::detect(dims, frame.data.len(), allow_luma_only)?;

    trace!(
        width = dims.width(),
        height = dims.height(),
        ?layout,
        chroma_order = ?frame.chroma_order,
        "Decoding frame"
    );

    let width = dims.width() as usize;
    let height = dims.height() as usize;
    let y_plane = frame.y_plane();
    let uv_plane = frame.uv_plane();
    let mut rgba = vec![0u8; dims.rgba_len()];

    for y_idx in 0..height {
        let uv_row_start = (y_idx / 2) * width;
        let y_row_start = y_idx * width;
        let out_row_start = y_row_start * RGBA_BYTES_PER_PIXEL;

        // One chroma pair covers two horizontally adjacent pixels
        for x_idx in (0..width).step_by(2) {
            let (u, v) = match layout {
                FrameLayout::TwoPlane => {
                    let offset = uv_row_start + x_idx;
                    frame
                        .chroma_order
                        .split([uv_plane[offset], uv_plane[offset + 1]])
                }
                FrameLayout::LumaOnly => (NEUTRAL_CHROMA, NEUTRAL_CHROMA),
            };
            let contribution = ChromaContribution::new(u, v);

            for dx in 0..2 {
                let luma = y_plane[y_row_start + x_idx + dx];
                let out = out_row_start + (x_idx + dx) * RGBA_BYTES_PER_PIXEL;
                rgba[out..out + RGBA_BYTES_PER_PIXEL].copy_from_slice(&contribution.apply(luma));
            }
        }
    }

    ColorBuffer::from_vec(dims, rgba)
}

/// Per-block chroma terms, computed once and applied to the four luma samples
#[derive(Debug, Clone, Copy)]
struct ChromaContribution {
    r: i32,
    g: i32,
    b: i32,
}

impl ChromaContribution {
    #[inline]
    fn new(u: u8, v: u8) -> Self {
        let u = u as i32 - NEUTRAL_CHROMA as i32;
        let v = v as i32 - NEUTRAL_CHROMA as i32;
        Self {
            r: bt601::R_FROM_V * v,
            g: -(bt601::G_FROM_U * u) - bt601::G_FROM_V * v,
            b: bt601::B_FROM_U * u,
        }
    }

    #[inline]
    fn apply(&self, luma: u8) -> [u8; 4] {
        let y = (luma as i32 - bt601::Y_OFFSET) * bt601::Y_SCALE;
        [
            clamp_channel(y + self.r),
            clamp_channel(y + self.g),
            clamp_channel(y + self.b),
            u8::MAX,
        ]
    }
}

#[inline]
fn clamp_channel(value: i32) -> u8 {
    (value >> bt601::SHIFT).clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PipelineError;
    use crate::media::frame::{ChromaOrder, FrameDimensions};

    fn nv21_frame(width: u32, height: u32, luma: u8, u: u8, v: u8) -> Vec<u8> {
        let dims = FrameDimensions::new(width, height).unwrap();
        let mut data = vec![luma; dims.luma_len()];
        for _ in 0..dims.pixel_count() / 4 {
            data.push(v);
            data.push(u);
        }
        data
    }

    #[test]
    fn test_mid_gray_conversion() {
        let dims = FrameDimensions::new(4, 4).unwrap();
        let data = nv21_frame(4, 4, 128, 128, 128);
        let rgba = decode_frame(&RawFrame::new(&data, dims, ChromaOrder::Nv21), false).unwrap();

        // (128 - 16) * 1.164 ≈ 130
        for pixel in rgba.pixels() {
            assert_eq!(*pixel, [130, 130, 130, 255]);
        }
    }

    #[test]
    fn test_black_and_white_clamp() {
        let dims = FrameDimensions::new(2, 2).unwrap();
        let black = nv21_frame(2, 2, 0, 128, 128);
        let white = nv21_frame(2, 2, 255, 128, 128);

        let out = decode_frame(&RawFrame::new(&black, dims, ChromaOrder::Nv21), false).unwrap();
        assert_eq!(out.pixel(0, 0), [0, 0, 0, 255]);

        let out = decode_frame(&RawFrame::new(&white, dims, ChromaOrder::Nv21), false).unwrap();
        assert_eq!(out.pixel(1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn test_chroma_order_swaps_red_and_blue_bias() {
        let dims = FrameDimensions::new(2, 2).unwrap();
        // Strong V (red) in NV21 byte order: V first
        let data = nv21_frame(2, 2, 128, 128, 240);

        let nv21 = decode_frame(&RawFrame::new(&data, dims, ChromaOrder::Nv21), false).unwrap();
        let [r, _, b, _] = nv21.pixel(0, 0);
        assert!(r > b, "NV21 with high V should be reddish: r={r} b={b}");

        // Same bytes read as NV12 put the high sample into U (blue)
        let nv12 = decode_frame(&RawFrame::new(&data, dims, ChromaOrder::Nv12), false).unwrap();
        let [r, _, b, _] = nv12.pixel(0, 0);
        assert!(b > r, "NV12 with high U should be bluish: r={r} b={b}");
    }

    #[test]
    fn test_chroma_shared_across_block() {
        let dims = FrameDimensions::new(4, 2).unwrap();
        let mut data = vec![128u8; 8];
        // Left block neutral, right block red
        data.extend_from_slice(&[128, 128, 240, 128]);

        let out = decode_frame(&RawFrame::new(&data, dims, ChromaOrder::Nv21), false).unwrap();
        assert_eq!(out.pixel(0, 0), out.pixel(1, 1));
        assert_eq!(out.pixel(2, 0), out.pixel(3, 1));
        assert_ne!(out.pixel(0, 0), out.pixel(2, 0));
    }

    #[test]
    fn test_luma_only_fallback_is_grayscale() {
        let dims = FrameDimensions::new(4, 4).unwrap();
        let data: Vec<u8> = (0..16).map(|i| 16 + i * 10).collect();

        let out = decode_frame(&RawFrame::new(&data, dims, ChromaOrder::Nv21), true).unwrap();
        for pixel in out.pixels() {
            assert_eq!(pixel[0], pixel[1]);
            assert_eq!(pixel[1], pixel[2]);
            assert_eq!(pixel[3], 255);
        }
    }

    #[test]
    fn test_luma_only_rejected_without_fallback() {
        let dims = FrameDimensions::new(4, 4).unwrap();
        let data = vec![128u8; 16];
        let result = decode_frame(&RawFrame::new(&data, dims, ChromaOrder::Nv21), false);
        assert_eq!(
            result,
            Err(PipelineError::BufferSizeMismatch {
                expected: 24,
                actual: 16
            })
        );
    }

    #[test]
    fn test_short_buffer_rejected() {
        let dims = FrameDimensions::new(4, 4).unwrap();
        let data = vec![128u8; 23];
        assert!(decode_frame(&RawFrame::new(&data, dims, ChromaOrder::Nv21), true).is_err());
    }

    #[test]
    fn test_deterministic() {
        let dims = FrameDimensions::new(8, 4).unwrap();
        let data: Vec<u8> = (0..dims.two_plane_len()).map(|i| (i * 37 % 256) as u8).collect();
        let frame = RawFrame::new(&data, dims, ChromaOrder::Nv21);
        assert_eq!(
            decode_frame(&frame, false).unwrap(),
            decode_frame(&frame, false).unwrap()
        );
    }

    #[test]
    fn test_every_constructible_size_decodes_in_bounds() {
        // Odd sides never reach the block loop: they cannot be constructed
        assert!(FrameDimensions::new(3, 2).is_err());

        for width in 0..=9 {
            for height in 0..=9 {
                let Ok(dims) = FrameDimensions::new(width, height) else {
                    continue;
                };
                let data = vec![128u8; dims.two_plane_len()];
                let frame = RawFrame::new(&data, dims, ChromaOrder::Nv21);
                assert_eq!(decode_frame(&frame, false).unwrap().dimensions(), dims);

                let luma = vec![128u8; dims.luma_len()];
                let frame = RawFrame::new(&luma, dims, ChromaOrder::Nv21);
                assert!(decode_frame(&frame, true).is_ok());
            }
        }
    }
}
