// SPDX-License-Identifier: GPL-3.0-only

//! Pipeline-wide constants

use serde::{Deserialize, Serialize};

/// Canny low threshold. Gradient magnitudes at or below this value are never
/// edges; values between low and high survive only when linked to a strong edge.
pub const CANNY_LOW_THRESHOLD: u32 = 50;

/// Canny high threshold. Gradient magnitudes above this value seed edges.
pub const CANNY_HIGH_THRESHOLD: u32 = 150;

/// Value returned across the native boundary when a frame could not be processed
pub const FAILURE_HANDLE: i32 = 0;

/// Neutral chroma sample (zero color difference)
pub const NEUTRAL_CHROMA: u8 = 128;

/// Bytes per pixel of the packed RGBA output
pub const RGBA_BYTES_PER_PIXEL: usize = 4;

/// BT.601 limited-range YUV→RGB coefficients, scaled by 128 (7 fractional bits)
pub mod bt601 {
    pub const Y_OFFSET: i32 = 16;
    pub const Y_SCALE: i32 = 149; // 1.164
    pub const R_FROM_V: i32 = 204; // 1.596
    pub const G_FROM_U: i32 = 50; // 0.391
    pub const G_FROM_V: i32 = 104; // 0.813
    pub const B_FROM_U: i32 = 258; // 2.018
    pub const SHIFT: u32 = 7;
}

/// RGB→luma weights (0.299, 0.587, 0.114) scaled by 2^14
pub mod luma {
    pub const R_WEIGHT: u32 = 4899;
    pub const G_WEIGHT: u32 = 9617;
    pub const B_WEIGHT: u32 = 1868;
    pub const SHIFT: u32 = 14;
    pub const ROUND: u32 = 1 << (SHIFT - 1);
}

/// Per-frame processing mode selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessingMode {
    /// Upload the decoded color frame as-is
    #[default]
    Passthrough,
    /// Replace the frame with its binary edge map
    EdgeDetect,
}

impl ProcessingMode {
    /// All modes, in boundary value order
    pub const ALL: [ProcessingMode; 2] = [ProcessingMode::Passthrough, ProcessingMode::EdgeDetect];

    /// Decode the integer mode used at the native boundary (0 or 1)
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(ProcessingMode::Passthrough),
            1 => Some(ProcessingMode::EdgeDetect),
            _ => None,
        }
    }

    /// Integer value used at the native boundary
    pub fn as_raw(&self) -> i32 {
        match self {
            ProcessingMode::Passthrough => 0,
            ProcessingMode::EdgeDetect => 1,
        }
    }
}
