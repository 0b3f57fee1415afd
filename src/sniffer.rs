//! Decode-render-deliver pipeline for a single frame

use tracing::{debug, error, warn};

use crate::decoder::{BeaconDecoder, DecodedFrame};
use crate::report::{Report, render};
use crate::transport::Transport;
use crate::types::RawFrame;
use crate::validator::FrameClass;
use crate::{DecodeError, Result};

/// Result of feeding one frame through the pipeline.
#[derive(Debug)]
pub struct FeedOutcome {
    pub decoded: DecodedFrame,
    pub report: Report,
    /// Bytes the transport accepted
    pub accepted: usize,
    /// Non-fatal delivery conditions (truncation, short writes, transport errors)
    pub notices: Vec<DecodeError>,
}

impl FeedOutcome {
    pub fn class(&self) -> FrameClass {
        self.decoded.class
    }

    /// Whether the whole report reached the transport untruncated
    pub fn is_clean(&self) -> bool {
        self.notices.is_empty()
    }
}

/// Owns a [`BeaconDecoder`] and the transport its reports go to.
///
/// Each call to [`feed`](Sniffer::feed) fully validates, decodes, renders and
/// delivers one frame before returning.
///
/// `feed` never sleeps. The backpressure pause between delivered reports is
/// applied by the [`Driver`](crate::Driver) (see
/// [`DriverConfig::frame_pause`](crate::DriverConfig::frame_pause)); callers
/// feeding frames directly own that pause.
#[derive(Debug)]
pub struct Sniffer<T> {
    decoder: BeaconDecoder,
    transport: T,
}

impl<T: Transport> Sniffer<T> {
    pub fn new(transport: T) -> Self {
        Self::with_decoder(BeaconDecoder::new(), transport)
    }

    pub fn with_decoder(decoder: BeaconDecoder, transport: T) -> Self {
        Self { decoder, transport }
    }

    pub fn decoder(&self) -> &BeaconDecoder {
        &self.decoder
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Process one frame.
    ///
    /// Short frames and undecodable beacons return an error and nothing is
    /// delivered. Everything else produces a report that is handed to the
    /// transport exactly once; delivery problems are collected in
    /// [`FeedOutcome::notices`] rather than returned as errors.
    pub fn feed(&mut self, frame: &RawFrame) -> Result<FeedOutcome> {
        let decoded = match self.decoder.decode(frame) {
            Ok(decoded) => decoded,
            Err(err) => {
                match &err {
                    DecodeError::ShortFrame { .. } => debug!("Dropping frame: {}", err),
                    _ => error!("Beacon decode failed: {}", err),
                }
                return Err(err);
            }
        };

        let report = render(&decoded);
        let mut notices = Vec::new();
        if let Some(truncation) = report.truncation() {
            notices.push(truncation);
        }

        let produced = report.len();
        let accepted = match self.transport.write_nonblocking(report.as_bytes()) {
            Ok(accepted) if accepted < produced => {
                let short = DecodeError::ShortWrite { accepted, produced };
                warn!("{}", short);
                notices.push(short);
                accepted
            }
            Ok(accepted) => accepted,
            Err(source) => {
                error!("Transport write failed: {}", source);
                notices.push(DecodeError::Transport { source });
                0
            }
        };

        Ok(FeedOutcome { decoded, report, accepted, notices })
    }
}
