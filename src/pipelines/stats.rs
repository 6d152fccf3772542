// SPDX-License-Identifier: GPL-3.0-only

//! Frame counters kept alongside the pipeline. None of this feeds back into
//! processing.

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Frames-per-second over one-second windows of caller timestamps
#[derive(Debug, Clone, Copy, Default)]
pub struct FpsCounter {
    window_start_ns: Option<i64>,
    frames_in_window: u32,
    last_fps: Option<u32>,
}

impl FpsCounter {
    /// Count a frame. Returns the new rate when a window closes.
    ///
    /// The frame that opens a window is its reference point and is not
    /// counted; every later frame up to and including the closing one is.
    pub fn record(&mut self, timestamp_ns: i64) -> Option<u32> {
        let start = match self.window_start_ns {
            // Timestamps going backwards (camera restart) start a fresh window
            Some(start) if timestamp_ns >= start => start,
            _ => {
                self.window_start_ns = Some(timestamp_ns);
                self.frames_in_window = 0;
                return None;
            }
        };

        self.frames_in_window += 1;
        if timestamp_ns - start >= NANOS_PER_SECOND {
            let fps = self.frames_in_window;
            self.last_fps = Some(fps);
            self.window_start_ns = Some(timestamp_ns);
            self.frames_in_window = 0;
            return Some(fps);
        }
        None
    }

    /// Rate measured over the last completed window
    pub fn fps(&self) -> Option<u32> {
        self.last_fps
    }
}

/// Snapshot of pipeline bookkeeping
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStats {
    /// Frames uploaded successfully
    pub frames_processed: u64,
    /// Frames rejected or failed
    pub frames_failed: u64,
    /// Timestamp of the last successfully processed frame
    pub last_timestamp_ns: Option<i64>,
    pub fps: FpsCounter,
}
