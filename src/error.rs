//! Error types for beacon decoding and report delivery.
//!
//! Every failure the pipeline can hit is a [`DecodeError`] variant. None of them
//! are fatal to the process: the decoder stays usable for the next frame no
//! matter how the previous one ended.
//!
//! ## Error Categories
//!
//! - **Frame size**: [`DecodeError::ShortFrame`] aborts without a report,
//!   [`DecodeError::MalformedBeacon`] guards field extraction on undersized payloads
//! - **Field decoding**: unknown label codes, out-of-bounds reads, invalid bit ranges
//! - **Report delivery**: truncation and transport short writes (logged, not escalated)
//! - **Sources**: capture file parsing and provider failures
//!
//! ```rust
//! use phacolink::DecodeError;
//!
//! let error = DecodeError::unknown_enum("step_type", 14);
//! assert!(error.is_frame_local());
//! assert_eq!(error.to_string(), "Unknown step_type value 14");
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for decoder operations.
pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

/// Main error type for frame decoding and delivery.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("Frame too short: {length} bytes, need at least {required}")]
    ShortFrame { length: usize, required: usize },

    #[error("Malformed beacon: {payload_size}-byte payload, beacon window needs {required}")]
    MalformedBeacon { payload_size: usize, required: usize },

    #[error("Unknown {field} value {value}")]
    UnknownEnumValue { field: &'static str, value: u8 },

    #[error("Read of {width} byte(s) at payload offset {offset} exceeds {len}-byte payload")]
    OutOfBounds { offset: usize, width: usize, len: usize },

    #[error("Invalid bit range {start}..={end}")]
    InvalidBitRange { start: u8, end: u8 },

    #[error("Report truncated at {written} of {capacity} bytes")]
    Truncated { written: usize, capacity: usize },

    #[error("Transport accepted only {accepted} of {produced} bytes")]
    ShortWrite { accepted: usize, produced: usize },

    #[error("Transport write failed")]
    Transport {
        #[source]
        source: std::io::Error,
    },

    #[error("Capture parse error on line {line}: {details}")]
    Capture { line: usize, details: String },

    #[error("Capture file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Frame provider failed: {reason}")]
    Provider {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DecodeError {
    /// Returns whether this error only concerns the frame being processed.
    ///
    /// Frame-local errors are counted and logged; the pipeline moves on to the
    /// next frame. Source errors (capture files, providers) may end a stream.
    pub fn is_frame_local(&self) -> bool {
        match self {
            DecodeError::ShortFrame { .. }
            | DecodeError::MalformedBeacon { .. }
            | DecodeError::UnknownEnumValue { .. }
            | DecodeError::OutOfBounds { .. }
            | DecodeError::InvalidBitRange { .. }
            | DecodeError::Truncated { .. }
            | DecodeError::ShortWrite { .. }
            | DecodeError::Transport { .. } => true,
            DecodeError::Capture { .. }
            | DecodeError::File { .. }
            | DecodeError::Provider { .. } => false,
        }
    }

    /// Returns whether a (possibly partial) report still reached the transport.
    pub fn report_emitted(&self) -> bool {
        matches!(
            self,
            DecodeError::Truncated { .. }
                | DecodeError::ShortWrite { .. }
                | DecodeError::Transport { .. }
        )
    }

    /// Helper constructor for label table misses.
    pub fn unknown_enum(field: &'static str, value: u8) -> Self {
        DecodeError::UnknownEnumValue { field, value }
    }

    /// Helper constructor for bounds violations during field reads.
    pub fn out_of_bounds(offset: usize, width: usize, len: usize) -> Self {
        DecodeError::OutOfBounds { offset, width, len }
    }

    /// Helper constructor for capture file parse errors.
    pub fn capture(line: usize, details: impl Into<String>) -> Self {
        DecodeError::Capture { line, details: details.into() }
    }

    /// Helper constructor for capture file I/O errors.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        DecodeError::File { path, source }
    }

    /// Helper constructor for provider failures.
    pub fn provider_failed(reason: impl Into<String>) -> Self {
        DecodeError::Provider { reason: reason.into(), source: None }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::Transport { source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn error_messages_carry_their_context(
            field in "[a-z_]+",
            value in any::<u8>(),
            offset in 0usize..128,
            width in 1usize..3,
            len in 0usize..128,
            details in ".*",
        ) {
            let field: &'static str = Box::leak(field.into_boxed_str());
            let unknown = DecodeError::unknown_enum(field, value);
            prop_assert!(unknown.to_string().contains(field));
            prop_assert!(unknown.to_string().contains(&value.to_string()));

            let bounds = DecodeError::out_of_bounds(offset, width, len);
            prop_assert!(bounds.to_string().contains(&offset.to_string()));
            prop_assert!(bounds.to_string().contains(&len.to_string()));

            let capture = DecodeError::capture(7, details.clone());
            prop_assert!(capture.to_string().contains(&details));
            prop_assert!(capture.to_string().contains("line 7"));
        }
    }

    #[test]
    fn frame_local_classification() {
        assert!(DecodeError::ShortFrame { length: 3, required: 16 }.is_frame_local());
        assert!(DecodeError::unknown_enum("network_state", 5).is_frame_local());
        assert!(DecodeError::ShortWrite { accepted: 1, produced: 2 }.is_frame_local());
        assert!(!DecodeError::capture(1, "bad hex").is_frame_local());
        assert!(!DecodeError::provider_failed("radio gone").is_frame_local());
    }

    #[test]
    fn delivery_errors_still_emit_reports() {
        assert!(DecodeError::Truncated { written: 255, capacity: 255 }.report_emitted());
        assert!(DecodeError::ShortWrite { accepted: 10, produced: 90 }.report_emitted());
        assert!(!DecodeError::ShortFrame { length: 3, required: 16 }.report_emitted());
        assert!(!DecodeError::unknown_enum("step_type", 14).report_emitted());
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<DecodeError>();

        let error = DecodeError::provider_failed("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn io_errors_convert_to_transport() {
        let io_err = std::io::Error::new(std::io::ErrorKind::WouldBlock, "fifo full");
        match DecodeError::from(io_err) {
            DecodeError::Transport { source } => assert_eq!(source.to_string(), "fifo full"),
            other => panic!("Expected Transport variant, got {other:?}"),
        }
    }
}
