//! Text capture format for recorded frames
//!
//! One frame per line, whitespace separated:
//!
//! ```text
//! # timestamp_us lqi rssi_dbm frame_hex
//! 1700000123 212 -41 4188ffff...0000
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::types::{LinkMetadata, RawFrame};
use crate::{DecodeError, Result};

/// Parse one capture line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<RawFrame>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut parts = trimmed.split_whitespace();
    let mut next = |name: &str| {
        parts.next().ok_or_else(|| DecodeError::capture(line_number, format!("missing {}", name)))
    };

    let timestamp = next("timestamp")?;
    let lqi = next("lqi")?;
    let rssi = next("rssi")?;
    let frame_hex = next("frame bytes")?;

    let timestamp_us = timestamp.parse::<u64>().map_err(|e| {
        DecodeError::capture(line_number, format!("invalid timestamp '{}': {}", timestamp, e))
    })?;
    let lqi = lqi
        .parse::<u8>()
        .map_err(|e| DecodeError::capture(line_number, format!("invalid lqi '{}': {}", lqi, e)))?;
    let rssi_dbm = rssi
        .parse::<i8>()
        .map_err(|e| DecodeError::capture(line_number, format!("invalid rssi '{}': {}", rssi, e)))?;
    let data = hex::decode(frame_hex)
        .map_err(|e| DecodeError::capture(line_number, format!("invalid frame hex: {}", e)))?;

    if parts.next().is_some() {
        return Err(DecodeError::capture(line_number, "unexpected trailing fields"));
    }

    trace!("Capture line {}: {} bytes at {}us", line_number, data.len(), timestamp_us);
    Ok(Some(RawFrame::new(data, LinkMetadata::new(lqi, rssi_dbm, timestamp_us))))
}

/// Format a frame as one capture line (without newline).
pub fn format_line(frame: &RawFrame) -> String {
    format!(
        "{} {} {} {}",
        frame.link.timestamp_us,
        frame.link.lqi,
        frame.link.rssi_dbm,
        hex::encode(&frame.data)
    )
}

/// Sequential reader over a capture file.
pub struct CaptureReader<R> {
    lines: std::io::Lines<R>,
    line_number: usize,
    frames_read: usize,
    path: PathBuf,
}

impl CaptureReader<BufReader<File>> {
    /// Open a capture file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| DecodeError::file_error(path.to_path_buf(), e))?;
        debug!("Opened capture file {}", path.display());
        Ok(Self::with_path(BufReader::new(file), path.to_path_buf()))
    }
}

impl<R: BufRead> CaptureReader<R> {
    /// Read captures from any buffered source.
    pub fn new(reader: R) -> Self {
        Self::with_path(reader, PathBuf::from("<memory>"))
    }

    fn with_path(reader: R, path: PathBuf) -> Self {
        Self { lines: reader.lines(), line_number: 0, frames_read: 0, path }
    }

    /// Next frame, or `None` at end of input.
    pub fn read_next_frame(&mut self) -> Result<Option<RawFrame>> {
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = line.map_err(|e| DecodeError::file_error(self.path.clone(), e))?;
            if let Some(frame) = parse_line(&line, self.line_number)? {
                self.frames_read += 1;
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    /// Frames returned so far
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Append frames to a capture sink, one line each.
pub struct CaptureWriter<W> {
    inner: W,
    frames_written: usize,
}

impl<W: Write> CaptureWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, frames_written: 0 }
    }

    pub fn write_frame(&mut self, frame: &RawFrame) -> std::io::Result<()> {
        writeln!(self.inner, "{}", format_line(frame))?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
