// SPDX-License-Identifier: GPL-3.0-only

//! Frame buffer types shared by the decoder, the edge filter and the textures

use crate::constants::RGBA_BYTES_PER_PIXEL;
use crate::errors::{PipelineError, PipelineResult};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width and height of a frame in pixels.
///
/// Only constructible through [`FrameDimensions::new`], so every value held
/// by the pipeline has even, non-zero sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameDimensions {
    width: u32,
    height: u32,
}

impl FrameDimensions {
    /// Validate dimensions for a 4:2:0 frame.
    ///
    /// Both sides must be non-zero and even so that every 2x2 block owns
    /// exactly one chroma pair.
    pub fn new(width: u32, height: u32) -> PipelineResult<Self> {
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(PipelineError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }
        Ok(Self { width, height })
    }

    /// Validate dimensions received as signed integers at the native boundary
    pub fn from_raw(width: i32, height: i32) -> PipelineResult<Self> {
        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => Self::new(w, h),
            _ => Err(PipelineError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Size of the luma plane alone
    pub fn luma_len(&self) -> usize {
        self.pixel_count()
    }

    /// Size of the two-plane layout: luma followed by interleaved chroma at quarter resolution
    pub fn two_plane_len(&self) -> usize {
        self.pixel_count() + self.pixel_count() / 2
    }

    pub fn rgba_len(&self) -> usize {
        self.pixel_count() * RGBA_BYTES_PER_PIXEL
    }
}

impl fmt::Display for FrameDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Byte order of the interleaved chroma plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChromaOrder {
    /// V first, then U (Android camera default)
    #[default]
    Nv21,
    /// U first, then V
    Nv12,
}

impl ChromaOrder {
    /// Split an interleaved chroma pair into (u, v)
    #[inline]
    pub fn split(&self, pair: [u8; 2]) -> (u8, u8) {
        match self {
            ChromaOrder::Nv21 => (pair[1], pair[0]),
            ChromaOrder::Nv12 => (pair[0], pair[1]),
        }
    }
}

/// Plane layout detected from the buffer length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLayout {
    /// Luma plane followed by the interleaved chroma plane
    TwoPlane,
    /// Luma plane only; decoded with neutral chroma
    LumaOnly,
}

impl FrameLayout {
    /// Determine the layout of a buffer of `len` bytes.
    ///
    /// A luma-only buffer is only accepted when `allow_luma_only` is set;
    /// otherwise the error reports the two-plane size.
    pub fn detect(
        dimensions: FrameDimensions,
        len: usize,
        allow_luma_only: bool,
    ) -> PipelineResult<Self> {
        if len == dimensions.two_plane_len() {
            Ok(FrameLayout::TwoPlane)
        } else if allow_luma_only && len == dimensions.luma_len() {
            Ok(FrameLayout::LumaOnly)
        } else {
            Err(PipelineError::BufferSizeMismatch {
                expected: dimensions.two_plane_len(),
                actual: len,
            })
        }
    }
}

/// Raw camera frame borrowed from the caller for the duration of one call
#[derive(Debug, Clone, Copy)]
pub struct RawFrame<'a> {
    pub dimensions: FrameDimensions,
    pub chroma_order: ChromaOrder,
    pub data: &'a [u8],
}

impl<'a> RawFrame<'a> {
    pub fn new(data: &'a [u8], dimensions: FrameDimensions, chroma_order: ChromaOrder) -> Self {
        Self {
            dimensions,
            chroma_order,
            data,
        }
    }

    /// Luma plane (first `width * height` bytes)
    pub fn y_plane(&self) -> &'a [u8] {
        let end = self.dimensions.luma_len().min(self.data.len());
        &self.data[..end]
    }

    /// Interleaved chroma plane (empty for luma-only buffers)
    pub fn uv_plane(&self) -> &'a [u8] {
        let start = self.dimensions.luma_len().min(self.data.len());
        &self.data[start..]
    }
}

/// Packed RGBA8 frame, row-major, no padding
#[derive(Clone, PartialEq, Eq)]
pub struct ColorBuffer {
    dimensions: FrameDimensions,
    data: Vec<u8>,
}

impl ColorBuffer {
    /// Wrap an RGBA byte vector; its length must be `width * height * 4`
    pub fn from_vec(dimensions: FrameDimensions, data: Vec<u8>) -> PipelineResult<Self> {
        if data.len() != dimensions.rgba_len() {
            return Err(PipelineError::BufferSizeMismatch {
                expected: dimensions.rgba_len(),
                actual: data.len(),
            });
        }
        Ok(Self { dimensions, data })
    }

    /// Buffer filled with a single color
    pub fn filled(dimensions: FrameDimensions, rgba: [u8; 4]) -> Self {
        let data = rgba.repeat(dimensions.pixel_count());
        Self { dimensions, data }
    }

    pub fn dimensions(&self) -> FrameDimensions {
        self.dimensions
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixels as RGBA quadruples
    pub fn pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels()[y as usize * self.dimensions.width as usize + x as usize]
    }

    /// Convert into an `image` buffer for inspection or encoding by the host
    pub fn to_image(&self) -> RgbaImage {
        // Length is checked on construction, so from_raw cannot fail
        RgbaImage::from_raw(self.width(), self.height(), self.data.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width(), self.height()))
    }

    /// Build a color buffer from an `image` buffer
    pub fn from_image(image: &RgbaImage) -> PipelineResult<Self> {
        let dimensions = FrameDimensions::new(image.width(), image.height())?;
        Self::from_vec(dimensions, image.as_raw().clone())
    }
}

impl fmt::Debug for ColorBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ColorBuffer({}, {} bytes)", self.dimensions, self.data.len())
    }
}
