//! Provider trait for frame sources

use crate::Result;
use crate::types::RawFrame;

/// Trait for radio frame sources
///
/// Providers abstract over where frames come from (a live radio, a recorded
/// capture) and handle their own timing internally.
#[async_trait::async_trait]
pub trait FrameProvider: Send + 'static {
    /// Get the next received frame
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - New frame available
    /// - `Ok(None)` - Source exhausted (normal termination)
    /// - `Err(e)` - Error occurred; the caller may retry
    async fn next_frame(&mut self) -> Result<Option<RawFrame>>;

    /// Short human-readable name for logs
    fn name(&self) -> &str {
        "provider"
    }
}

#[async_trait::async_trait]
impl<P: FrameProvider + ?Sized> FrameProvider for Box<P> {
    async fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        (**self).next_frame().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
