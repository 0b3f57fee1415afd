//! Passive decoder for phaco console wireless footswitch beacons.
//!
//! Phacolink turns raw IEEE 802.15.4 frames captured by a sniffer radio into
//! fixed-format diagnostic text reports for a console.
//!
//! # Features
//!
//! - **Frame classification**: short, malformed and beacon frames by length
//! - **Field extraction**: bounds-checked bit and byte reads with validated label tables
//! - **Bounded reports**: 255-byte reports rendered without allocation
//! - **Async driver**: capture replay or live channel input on a tokio task
//!
//! # Quick Start
//!
//! Decode a single frame synchronously:
//!
//! ```rust
//! use phacolink::{BeaconFrameBuilder, BufferTransport, Sniffer};
//!
//! let mut sniffer = Sniffer::new(BufferTransport::new());
//! let frame = BeaconFrameBuilder::new().network_state(2).footswitch_id(7).build();
//!
//! let outcome = sniffer.feed(&frame)?;
//! assert!(outcome.report.as_str().starts_with("<BEACON PACKET> "));
//! assert!(sniffer.transport().text().contains("FSID: 7\n"));
//! # Ok::<(), phacolink::DecodeError>(())
//! ```
//!
//! ## Example (capture replay)
//!
//! ```rust,no_run
//! use phacolink::{Phacolink, WriterTransport};
//!
//! #[tokio::main]
//! async fn main() -> phacolink::Result<()> {
//!     let transport = WriterTransport::new(std::io::stdout());
//!     let driver = Phacolink::replay("session.cap", transport).await?;
//!     let outcome = driver.join().await?;
//!     println!("{} reports", outcome.stats.reports());
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
pub mod types;

// Decode pipeline
pub mod decoder;
pub mod report;
pub mod sniffer;
pub mod transport;
pub mod validator;

// Frame sources
pub mod capture;
pub mod driver;
pub mod provider;
pub mod providers;

pub mod builder;

// Core exports
pub use error::*;
pub use types::*;

// Pipeline exports
pub use builder::BeaconFrameBuilder;
pub use decoder::{BeaconDecoder, DecodedFrame, MessageCounter};
pub use report::{Report, ReportBuilder, render};
pub use sniffer::{FeedOutcome, Sniffer};
pub use transport::{BufferTransport, Transport, WriterTransport};
pub use validator::FrameClass;

// Source exports
pub use capture::{CaptureReader, CaptureWriter};
pub use driver::{Driver, DriverChannels, DriverConfig, DriverOutcome, DriverStats};
pub use provider::FrameProvider;
pub use providers::{ChannelProvider, FrameSender, ReplayProvider};

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to
/// `phacolink=info`.
pub fn init_tracing() -> std::result::Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("phacolink=info"));
    tracing_subscriber::fmt().with_env_filter(filter).finish().try_init()
}

/// Unified entry point for running the decoder against a frame source.
///
/// # Examples
///
/// ## Live radio
/// ```rust,no_run
/// use phacolink::{BufferTransport, Phacolink};
///
/// #[tokio::main]
/// async fn main() -> phacolink::Result<()> {
///     let (radio, driver) = Phacolink::live(BufferTransport::new()).await;
///     // Hand `radio` to the receive path...
///     # drop(radio);
///     driver.join().await?;
///     Ok(())
/// }
/// ```
pub struct Phacolink;

impl Phacolink {
    /// Replay a capture file through a new decoder.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture file cannot be opened. Malformed lines
    /// are reported by the driver as provider errors once replay reaches them.
    pub async fn replay<P, T>(path: P, transport: T) -> Result<DriverChannels<T>>
    where
        P: AsRef<std::path::Path>,
        T: Transport,
    {
        let path = path.as_ref();
        info!("Starting replay of {}", path.display());
        let provider = ReplayProvider::new(path)?;
        Ok(Driver::spawn(provider, Sniffer::new(transport), DriverConfig::default()))
    }

    /// Start a decoder fed by a live radio.
    ///
    /// Frames sent through the returned [`FrameSender`] are decoded in arrival
    /// order; the driver ends once every sender is dropped.
    pub async fn live<T: Transport>(transport: T) -> (FrameSender, DriverChannels<T>) {
        info!("Starting live decoder");
        let (sender, provider) = ChannelProvider::new();
        let channels = Driver::spawn(provider, Sniffer::new(transport), DriverConfig::default());
        (sender, channels)
    }
}
