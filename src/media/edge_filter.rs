// SPDX-License-Identifier: GPL-3.0-only

//! Binary edge map using Canny edge detection
//!
//! The color frame is reduced to luma, differentiated with 3x3 Sobel kernels
//! (borders replicated), thinned by non-maximum suppression along the
//! gradient direction and finally linked by hysteresis between the low and
//! high thresholds. All arithmetic is integer, so the output is bit-exact for
//! identical input.

use crate::constants::{CANNY_HIGH_THRESHOLD, CANNY_LOW_THRESHOLD, luma};
use crate::media::frame::ColorBuffer;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// tan(22.5°) in 15-bit fixed point
const TAN_22_5_Q15: i64 = 13573;

const EDGE_PIXEL: [u8; 4] = [255, 255, 255, 255];
const BACKGROUND_PIXEL: [u8; 4] = [0, 0, 0, 255];

/// Gradient magnitude thresholds for hysteresis linking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeThresholds {
    /// Weaker gradients are discarded outright
    pub low: u32,
    /// Stronger gradients seed edges
    pub high: u32,
}

impl EdgeThresholds {
    /// Create thresholds, swapping them if given in the wrong order
    pub fn new(low: u32, high: u32) -> Self {
        if low > high {
            warn!(low, high, "Edge thresholds out of order, swapping");
            Self {
                low: high,
                high: low,
            }
        } else {
            Self { low, high }
        }
    }
}

impl Default for EdgeThresholds {
    fn default() -> Self {
        Self {
            low: CANNY_LOW_THRESHOLD,
            high: CANNY_HIGH_THRESHOLD,
        }
    }
}

/// Classification of a pixel after non-maximum suppression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeClass {
    None,
    Weak,
    Strong,
}

/// Produce a white-on-black edge map of `color` with opaque alpha.
pub fn detect_edges(color: &ColorBuffer, thresholds: EdgeThresholds) -> ColorBuffer {
    let width = color.width() as usize;
    let height = color.height() as usize;

    let gray = to_luminance(color);
    let (gx, gy) = sobel(&gray, width, height);
    let magnitude: Vec<u32> = gx
        .iter()
        .zip(&gy)
        .map(|(x, y)| x.unsigned_abs() + y.unsigned_abs())
        .collect();

    let classes = suppress_non_maxima(&gx, &gy, &magnitude, width, height, thresholds);
    let edges = hysteresis(&classes, width, height);

    let edge_count = edges.iter().filter(|&&e| e).count();
    debug!(width, height, edge_count, "Edge detection complete");

    let data: Vec<u8> = edges
        .iter()
        .flat_map(|&edge| if edge { EDGE_PIXEL } else { BACKGROUND_PIXEL })
        .collect();

    // Same dimensions as the input, so the length always matches
    ColorBuffer::from_vec(color.dimensions(), data)
        .unwrap_or_else(|_| ColorBuffer::filled(color.dimensions(), BACKGROUND_PIXEL))
}

/// Weighted RGB→luma reduction (BT.601 weights)
fn to_luminance(color: &ColorBuffer) -> Vec<u8> {
    color
        .pixels()
        .iter()
        .map(|&[r, g, b, _]| {
            let sum = r as u32 * luma::R_WEIGHT
                + g as u32 * luma::G_WEIGHT
                + b as u32 * luma::B_WEIGHT
                + luma::ROUND;
            (sum >> luma::SHIFT) as u8
        })
        .collect()
}

/// 3x3 Sobel gradients with replicated borders
fn sobel(gray: &[u8], width: usize, height: usize) -> (Vec<i32>, Vec<i32>) {
    let sample = |x: isize, y: isize| -> i32 {
        let x = x.clamp(0, width as isize - 1) as usize;
        let y = y.clamp(0, height as isize - 1) as usize;
        gray[y * width + x] as i32
    };

    let mut gx = vec![0i32; width * height];
    let mut gy = vec![0i32; width * height];

    for py in 0..height {
        for px in 0..width {
            let x = px as isize;
            let y = py as isize;

            let tl = sample(x - 1, y - 1);
            let tm = sample(x, y - 1);
            let tr = sample(x + 1, y - 1);
            let ml = sample(x - 1, y);
            let mr = sample(x + 1, y);
            let bl = sample(x - 1, y + 1);
            let bm = sample(x, y + 1);
            let br = sample(x + 1, y + 1);

            let idx = py * width + px;
            gx[idx] = -tl - 2 * ml - bl + tr + 2 * mr + br;
            gy[idx] = -tl - 2 * tm - tr + bl + 2 * bm + br;
        }
    }

    (gx, gy)
}

/// Keep only local maxima along the quantized gradient direction and
/// classify them against the thresholds.
fn suppress_non_maxima(
    gx: &[i32],
    gy: &[i32],
    magnitude: &[u32],
    width: usize,
    height: usize,
    thresholds: EdgeThresholds,
) -> Vec<EdgeClass> {
    // Neighbors outside the frame count as zero magnitude
    let mag_at = |x: isize, y: isize| -> u32 {
        if x < 0 || y < 0 || x >= width as isize || y >= height as isize {
            0
        } else {
            magnitude[y as usize * width + x as usize]
        }
    };

    let mut classes = vec![EdgeClass::None; width * height];

    for py in 0..height {
        for px in 0..width {
            let idx = py * width + px;
            let m = magnitude[idx];
            if m <= thresholds.low {
                continue;
            }

            let x = px as isize;
            let y = py as isize;
            let ax = gx[idx].unsigned_abs() as i64;
            let ay = (gy[idx].unsigned_abs() as i64) << 15;
            let tan22 = ax * TAN_22_5_Q15;

            let is_maximum = if ay < tan22 {
                // Mostly horizontal gradient: compare left/right
                m > mag_at(x - 1, y) && m >= mag_at(x + 1, y)
            } else if ay > tan22 + (ax << 16) {
                // Mostly vertical gradient: compare above/below
                m > mag_at(x, y - 1) && m >= mag_at(x, y + 1)
            } else {
                // Diagonal: same signs run top-left to bottom-right
                let s = if (gx[idx] ^ gy[idx]) < 0 { -1 } else { 1 };
                m > mag_at(x - s, y - 1) && m > mag_at(x + s, y + 1)
            };

            if is_maximum {
                classes[idx] = if m > thresholds.high {
                    EdgeClass::Strong
                } else {
                    EdgeClass::Weak
                };
            }
        }
    }

    classes
}

/// Promote weak pixels 8-connected to a strong pixel; drop the rest.
fn hysteresis(classes: &[EdgeClass], width: usize, height: usize) -> Vec<bool> {
    let mut edges = vec![false; width * height];
    let mut stack: Vec<usize> = Vec::new();

    for (idx, class) in classes.iter().enumerate() {
        if *class == EdgeClass::Strong {
            edges[idx] = true;
            stack.push(idx);
        }
    }

    while let Some(idx) = stack.pop() {
        let px = (idx % width) as isize;
        let py = (idx / width) as isize;

        for dy in -1..=1 {
            for dx in -1..=1 {
                let nx = px + dx;
                let ny = py + dy;
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                let n = ny as usize * width + nx as usize;
                if !edges[n] && classes[n] == EdgeClass::Weak {
                    edges[n] = true;
                    stack.push(n);
                }
            }
        }
    }

    edges
}
