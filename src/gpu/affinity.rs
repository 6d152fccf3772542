// SPDX-License-Identifier: GPL-3.0-only

//! Thread affinity of the rendering context.
//!
//! GPU commands for a context must come from the thread that created it. Every
//! texture carries a copy of its context's [`ContextThread`] and checks it
//! before touching the GPU.

use crate::errors::{PipelineError, PipelineResult};
use std::thread::{self, ThreadId};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextThread {
    owner: ThreadId,
}

impl ContextThread {
    /// Bind to the calling thread
    pub fn current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    pub fn is_current(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Fail with `ContextAffinityViolation` when called from any other thread
    pub fn ensure_current(&self, operation: &'static str) -> PipelineResult<()> {
        if self.is_current() {
            return Ok(());
        }
        let caller = thread::current();
        error!(
            operation,
            owner = ?self.owner,
            caller = ?caller.id(),
            caller_name = caller.name().unwrap_or("<unnamed>"),
            "GPU operation issued off the rendering context thread"
        );
        Err(PipelineError::ContextAffinityViolation)
    }
}
