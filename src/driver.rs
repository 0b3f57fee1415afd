//! Driver spawns and manages the frame processing task

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::decoder::DecodedFrame;
use crate::provider::FrameProvider;
use crate::sniffer::{FeedOutcome, Sniffer};
use crate::transport::Transport;
use crate::validator::FrameClass;
use crate::{DecodeError, Result};

/// Pause after every frame whose report was handed to the transport
pub const DEFAULT_FRAME_PAUSE: Duration = Duration::from_millis(5);

/// Consecutive provider errors tolerated before the driver stops
pub const DEFAULT_MAX_PROVIDER_ERRORS: u32 = 10;

/// Driver tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Backpressure pause between delivered reports
    pub frame_pause: Duration,
    /// Consecutive provider errors before shutdown
    pub max_provider_errors: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { frame_pause: DEFAULT_FRAME_PAUSE, max_provider_errors: DEFAULT_MAX_PROVIDER_ERRORS }
    }
}

/// Running counters for everything the driver has processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DriverStats {
    /// Frames received from the provider
    pub frames: u64,
    pub beacons: u64,
    pub malformed: u64,
    pub short_frames: u64,
    /// Beacons rejected during field extraction
    pub decode_errors: u64,
    /// Beacons carrying a status block
    pub status_frames: u64,
    pub truncated: u64,
    pub short_writes: u64,
    pub transport_errors: u64,
    pub provider_errors: u64,
    /// Set once the driver task has stopped
    pub finished: bool,
}

impl DriverStats {
    /// Reports handed to the transport
    pub fn reports(&self) -> u64 {
        self.beacons + self.malformed
    }

    fn record_outcome(&mut self, outcome: &FeedOutcome) {
        match outcome.class() {
            FrameClass::Beacon => self.beacons += 1,
            FrameClass::Malformed => self.malformed += 1,
        }
        if outcome.decoded.status.is_some() {
            self.status_frames += 1;
        }
        for notice in &outcome.notices {
            match notice {
                DecodeError::Truncated { .. } => self.truncated += 1,
                DecodeError::ShortWrite { .. } => self.short_writes += 1,
                DecodeError::Transport { .. } => self.transport_errors += 1,
                _ => {}
            }
        }
    }

    fn record_rejection(&mut self, err: &DecodeError) {
        match err {
            DecodeError::ShortFrame { .. } => self.short_frames += 1,
            _ => self.decode_errors += 1,
        }
    }
}

/// What the driver task hands back when it ends
#[derive(Debug)]
pub struct DriverOutcome<T> {
    pub stats: DriverStats,
    pub sniffer: Sniffer<T>,
}

/// Result of spawning the driver task
pub struct DriverChannels<T> {
    /// Receiver for running statistics
    pub stats: watch::Receiver<DriverStats>,
    /// Receiver for the most recently delivered frame
    pub decoded: watch::Receiver<Option<Arc<DecodedFrame>>>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
    task: JoinHandle<DriverOutcome<T>>,
}

impl<T: Transport> DriverChannels<T> {
    /// Statistics as a stream, starting with the current value
    pub fn stats_stream(&self) -> impl Stream<Item = DriverStats> + 'static {
        WatchStream::new(self.stats.clone())
    }

    /// Delivered frames as a stream
    ///
    /// Backed by a watch channel: a slow consumer sees the latest frame, not
    /// every frame.
    pub fn decoded_stream(&self) -> impl Stream<Item = Arc<DecodedFrame>> + 'static {
        WatchStream::new(self.decoded.clone()).filter_map(|opt| async move { opt })
    }

    /// Snapshot of the current statistics
    pub fn current_stats(&self) -> DriverStats {
        *self.stats.borrow()
    }

    /// Wait for the driver to run to completion.
    pub async fn join(self) -> Result<DriverOutcome<T>> {
        self.task.await.map_err(|e| DecodeError::Provider {
            reason: "driver task failed".to_string(),
            source: Some(Box::new(e)),
        })
    }

    /// Cancel the driver and wait for it to stop.
    pub async fn shutdown(self) -> Result<DriverOutcome<T>> {
        self.cancel.cancel();
        self.join().await
    }
}

/// Driver spawns and manages the frame processing task
///
/// The spawned task owns both the provider and the [`Sniffer`], so frames are
/// decoded strictly one at a time with a single writer for the message
/// counter.
pub struct Driver;

impl Driver {
    /// Spawn the processing task for the given provider and sniffer.
    pub fn spawn<P, T>(provider: P, sniffer: Sniffer<T>, config: DriverConfig) -> DriverChannels<T>
    where
        P: FrameProvider,
        T: Transport,
    {
        let (stats_tx, stats_rx) = watch::channel(DriverStats::default());
        let (decoded_tx, decoded_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let cancel_task = cancel.clone();
        let task = tokio::spawn(async move {
            Self::frame_task(provider, sniffer, config, stats_tx, decoded_tx, cancel_task).await
        });

        DriverChannels { stats: stats_rx, decoded: decoded_rx, cancel, task }
    }

    async fn frame_task<P, T>(
        mut provider: P,
        mut sniffer: Sniffer<T>,
        config: DriverConfig,
        stats_tx: watch::Sender<DriverStats>,
        decoded_tx: watch::Sender<Option<Arc<DecodedFrame>>>,
        cancel: CancellationToken,
    ) -> DriverOutcome<T>
    where
        P: FrameProvider,
        T: Transport,
    {
        info!("Frame task started ({})", provider.name());
        let mut stats = DriverStats::default();
        let mut error_count = 0u32;

        loop {
            if cancel.is_cancelled() {
                info!("Frame task cancelled");
                break;
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Frame task cancelled during read");
                    break;
                }
                result = provider.next_frame() => result,
            };

            match result {
                Ok(Some(frame)) => {
                    error_count = 0;
                    stats.frames += 1;
                    trace!("Frame {}: {} bytes", stats.frames, frame.len());

                    let delivered = match sniffer.feed(&frame) {
                        Ok(outcome) => {
                            stats.record_outcome(&outcome);
                            decoded_tx.send_replace(Some(Arc::new(outcome.decoded)));
                            true
                        }
                        Err(err) => {
                            stats.record_rejection(&err);
                            false
                        }
                    };
                    stats_tx.send_replace(stats);

                    if delivered && !config.frame_pause.is_zero() {
                        tokio::select! {
                            _ = cancel.cancelled() => {
                                info!("Frame task cancelled during pause");
                                break;
                            }
                            _ = tokio::time::sleep(config.frame_pause) => {}
                        }
                    }
                }
                Ok(None) => {
                    info!("Provider stream ended after {} frames", stats.frames);
                    break;
                }
                Err(e) => {
                    error_count += 1;
                    stats.provider_errors += 1;
                    stats_tx.send_replace(stats);
                    error!(
                        "Provider error ({}/{}): {}",
                        error_count, config.max_provider_errors, e
                    );

                    if error_count >= config.max_provider_errors {
                        error!("Too many provider errors, shutting down");
                        break;
                    }

                    // Exponential backoff: 100ms, 200ms, 400ms, ... capped at 1.6s
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            info!("Frame task cancelled during backoff");
                            break;
                        }
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }

        stats.finished = true;
        stats_tx.send_replace(stats);
        debug!("Final stats: {:?}", stats);
        info!("Frame task ended (processed {} frames)", stats.frames);

        DriverOutcome { stats, sniffer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BeaconFrameBuilder;
    use crate::providers::ChannelProvider;
    use crate::transport::BufferTransport;
    use crate::types::{LinkMetadata, RawFrame};
    use std::collections::VecDeque;

    /// Provider scripted with a fixed sequence of results
    struct Scripted {
        results: VecDeque<Result<Option<RawFrame>>>,
    }

    #[async_trait::async_trait]
    impl FrameProvider for Scripted {
        async fn next_frame(&mut self) -> Result<Option<RawFrame>> {
            self.results.pop_front().unwrap_or(Ok(None))
        }
    }

    fn spawn_buffered<P: FrameProvider>(
        provider: P,
        config: DriverConfig,
    ) -> DriverChannels<BufferTransport> {
        Driver::spawn(provider, Sniffer::new(BufferTransport::new()), config)
    }

    #[tokio::test(start_paused = true)]
    async fn counts_every_frame_class() {
        let (tx, provider) = ChannelProvider::new();
        let channels = spawn_buffered(provider, DriverConfig::default());

        tx.send(BeaconFrameBuilder::new().status(true).build()).await.unwrap();
        tx.send(BeaconFrameBuilder::new().payload_len(20).build()).await.unwrap();
        tx.send(RawFrame::new(vec![0; 4], LinkMetadata::default())).await.unwrap();
        tx.send(BeaconFrameBuilder::new().step_type(14).build()).await.unwrap();
        drop(tx);

        let outcome = channels.join().await.unwrap();
        let stats = outcome.stats;
        assert_eq!(stats.frames, 4);
        assert_eq!(stats.beacons, 1);
        assert_eq!(stats.status_frames, 1);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.short_frames, 1);
        assert_eq!(stats.decode_errors, 1);
        assert_eq!(stats.reports(), 2);
        assert!(stats.finished);
        assert_eq!(outcome.sniffer.transport().writes(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_only_after_delivered_reports() {
        let (tx, provider) = ChannelProvider::new();
        let config =
            DriverConfig { frame_pause: Duration::from_millis(5), ..DriverConfig::default() };
        let start = tokio::time::Instant::now();
        let channels = spawn_buffered(provider, config);

        for _ in 0..3 {
            tx.send(BeaconFrameBuilder::new().build()).await.unwrap();
        }
        for _ in 0..3 {
            tx.send(RawFrame::new(vec![0; 2], LinkMetadata::default())).await.unwrap();
        }
        drop(tx);

        channels.join().await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(15), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(20), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_consecutive_provider_errors() {
        let results = (0..3).map(|_| Err(DecodeError::provider_failed("radio reset"))).collect();
        let config = DriverConfig { max_provider_errors: 3, ..DriverConfig::default() };
        let channels = spawn_buffered(Scripted { results }, config);

        let stats = channels.join().await.unwrap().stats;
        assert_eq!(stats.provider_errors, 3);
        assert_eq!(stats.frames, 0);
        assert!(stats.finished);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_frames_reset_the_error_budget() {
        let frame = BeaconFrameBuilder::new().build();
        let results = VecDeque::from(vec![
            Err(DecodeError::provider_failed("glitch")),
            Ok(Some(frame.clone())),
            Err(DecodeError::provider_failed("glitch")),
            Ok(Some(frame)),
        ]);
        let config = DriverConfig { max_provider_errors: 2, ..DriverConfig::default() };
        let channels = spawn_buffered(Scripted { results }, config);

        let stats = channels.join().await.unwrap().stats;
        assert_eq!(stats.provider_errors, 2);
        assert_eq!(stats.beacons, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_a_waiting_driver() {
        let (_tx, provider) = ChannelProvider::new();
        let channels = spawn_buffered(provider, DriverConfig::default());

        let outcome = channels.shutdown().await.unwrap();
        assert!(outcome.stats.finished);
        assert_eq!(outcome.stats.frames, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_latest_decoded_frame() {
        let (tx, provider) = ChannelProvider::new();
        let channels = spawn_buffered(provider, DriverConfig::default());
        let mut decoded = Box::pin(channels.decoded_stream());

        tx.send(BeaconFrameBuilder::new().footswitch_id(77).build()).await.unwrap();
        let frame = decoded.next().await.unwrap();
        assert_eq!(frame.beacon.map(|b| b.footswitch_id), Some(77));

        drop(tx);
        channels.join().await.unwrap();
    }
}
