// SPDX-License-Identifier: GPL-3.0-only

use crate::errors::{PipelineError, PipelineResult};
use crate::media::{ChromaOrder, EdgeThresholds};
use serde::{Deserialize, Serialize};

/// Tunables for a frame pipeline.
///
/// Every field has a default, so a host only needs to supply the values it
/// wants to change, e.g. `{"chroma_order": "Nv12"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Byte order of the interleaved chroma plane delivered by the capture side
    pub chroma_order: ChromaOrder,
    /// Accept buffers holding only the luma plane and render them as grayscale
    pub allow_luma_only: bool,
    /// Edge detector thresholds (low 50, high 150)
    pub edge_thresholds: EdgeThresholds,
    /// Debug label attached to the GPU texture
    pub texture_label: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chroma_order: ChromaOrder::default(), // NV21 from Android cameras
            allow_luma_only: true,
            edge_thresholds: EdgeThresholds::default(),
            texture_label: "edge_viewer_frame".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let mut config: Self = serde_json::from_str(json)
            .map_err(|e| PipelineError::Config(format!("Invalid pipeline config: {}", e)))?;
        // Normalize order the same way programmatic construction does
        config.edge_thresholds =
            EdgeThresholds::new(config.edge_thresholds.low, config.edge_thresholds.high);
        Ok(config)
    }

    /// Serialize to a JSON document
    pub fn to_json(&self) -> PipelineResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(format!("Failed to serialize config: {}", e)))
    }
}
