//! Channel provider fed by a live radio task

use tokio::sync::mpsc;
use tracing::debug;

use crate::Result;
use crate::provider::FrameProvider;
use crate::types::RawFrame;

/// Default number of frames buffered between the radio and the pipeline
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Provider that receives frames pushed by a radio driver.
///
/// The stream ends once every [`FrameSender`] has been dropped.
pub struct ChannelProvider {
    rx: mpsc::Receiver<RawFrame>,
}

/// Sending half handed to the radio side.
pub type FrameSender = mpsc::Sender<RawFrame>;

impl ChannelProvider {
    pub fn new() -> (FrameSender, Self) {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (FrameSender, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { rx })
    }
}

#[async_trait::async_trait]
impl FrameProvider for ChannelProvider {
    async fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        let frame = self.rx.recv().await;
        if frame.is_none() {
            debug!("All radio senders dropped");
        }
        Ok(frame)
    }

    fn name(&self) -> &str {
        "live"
    }
}
