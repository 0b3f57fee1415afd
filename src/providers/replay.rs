//! Replay provider for capture files

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::Result;
use crate::capture::CaptureReader;
use crate::provider::FrameProvider;
use crate::types::RawFrame;

/// Replay provider that reads frames from a capture file
pub struct ReplayProvider {
    /// Capture file reader
    reader: CaptureReader<BufReader<File>>,

    /// Frame pacing, `None` replays as fast as the consumer pulls
    interval: Option<Interval>,

    /// Set once the reader has hit end of file
    finished: bool,
}

impl ReplayProvider {
    /// Open a capture file for replay
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = CaptureReader::open(path)?;
        info!("Opened capture file: {}", reader.path().display());
        Ok(Self { reader, interval: None, finished: false })
    }

    /// Pace frames `period` apart.
    pub fn with_pacing(mut self, period: Duration) -> Self {
        self.set_pacing(Some(period));
        self
    }

    /// Change or remove pacing between frames
    pub fn set_pacing(&mut self, period: Option<Duration>) {
        self.interval = period.filter(|p| !p.is_zero()).map(|p| {
            let mut pacing = interval(p);
            pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);
            pacing
        });
        debug!("Replay pacing set to {:?}", period);
    }

    /// Frames delivered so far
    pub fn frames_read(&self) -> usize {
        self.reader.frames_read()
    }
}

#[async_trait::async_trait]
impl FrameProvider for ReplayProvider {
    async fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        if self.finished {
            return Ok(None);
        }

        if let Some(pacing) = self.interval.as_mut() {
            pacing.tick().await;
        }

        match self.reader.read_next_frame()? {
            Some(frame) => {
                trace!("Replay frame {}: {} bytes", self.reader.frames_read(), frame.len());
                Ok(Some(frame))
            }
            None => {
                debug!("Reached end of replay after {} frames", self.reader.frames_read());
                self.finished = true;
                Ok(None)
            }
        }
    }

    fn name(&self) -> &str {
        "replay"
    }
}
