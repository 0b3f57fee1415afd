//! Bounded text report rendering
//!
//! A report is built section by section into a fixed-capacity
//! [`heapless::String`] of [`REPORT_MAX_LEN`] bytes. When a section does not
//! fit, the part that fits is kept, the report is flagged as truncated, and
//! later sections are dropped. Layout, in order:
//!
//! ```text
//! <BEACON PACKET> TS: 1234us|PS: 64|LQI: 200|RSSI: -40dBm
//! NS: Network Footswitch Active
//! FSID: 7
//! ST: I/A
//! PT: Status
//! VacLE: 500mmHg
//! FSTrdl: 1|IOPr: 30mmHg|IrrPr: 60mmHg|Reflux: Inactive|CIrr: Active|FSPen: 20|AsPr: -300mmHg|LonPwr: 40%|TorAmp: 10%
//! MC: 3
//! ```
//!
//! Field order and labels are scraped by existing console tooling and must not
//! change.

use heapless::String;
use std::fmt::{self, Write};
use tracing::warn;

use crate::DecodeError;
use crate::decoder::DecodedFrame;
use crate::types::layout::REPORT_MAX_LEN;
use crate::types::{BeaconFields, ConfigFields, LinkMetadata, StatusFields};
use crate::validator::FrameClass;

/// Rendered diagnostic report for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Report {
    text: String<REPORT_MAX_LEN>,
    truncated: bool,
}

impl Report {
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether one or more sections were cut to fit the buffer
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Truncation as an error value, for logging and statistics.
    pub fn truncation(&self) -> Option<DecodeError> {
        self.truncated
            .then(|| DecodeError::Truncated { written: self.len(), capacity: REPORT_MAX_LEN })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes into the report buffer, keeping whatever prefix fits.
struct Clamped<'a> {
    buf: &'a mut String<REPORT_MAX_LEN>,
    overflowed: bool,
}

impl Write for Clamped<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = REPORT_MAX_LEN - self.buf.len();
        if s.len() <= room {
            return self.buf.push_str(s).map_err(|_| fmt::Error);
        }

        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        let _ = self.buf.push_str(&s[..cut]);
        self.overflowed = true;
        Err(fmt::Error)
    }
}

/// Incremental report builder tracking remaining capacity.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    report: Report,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes still available
    pub fn remaining(&self) -> usize {
        REPORT_MAX_LEN - self.report.len()
    }

    /// Append one section. Returns `false` once the buffer has overflowed;
    /// nothing is appended after that.
    pub fn section(&mut self, args: fmt::Arguments<'_>) -> bool {
        if self.report.truncated {
            return false;
        }

        let mut out = Clamped { buf: &mut self.report.text, overflowed: false };
        let result = out.write_fmt(args);
        if out.overflowed || result.is_err() {
            self.report.truncated = true;
            return false;
        }
        true
    }

    pub fn finish(self) -> Report {
        self.report
    }

    fn tag(&mut self, class: FrameClass) -> bool {
        self.section(format_args!("{}", class.tag()))
    }

    fn metadata(&mut self, link: &LinkMetadata, payload_size: usize) -> bool {
        self.section(format_args!(
            "TS: {}us|PS: {}|LQI: {}|RSSI: {}dBm\n",
            link.timestamp_us, payload_size, link.lqi, link.rssi_dbm
        ))
    }

    fn beacon(&mut self, beacon: &BeaconFields) -> bool {
        self.section(format_args!(
            "NS: {}\nFSID: {}\nST: {}\nPT: {}\n",
            beacon.network_state, beacon.footswitch_id, beacon.step_type, beacon.payload_type
        ))
    }

    fn config(&mut self, config: &ConfigFields) -> bool {
        self.section(format_args!("VacLE: {}mmHg\n", config.range2_vacuum_limit_end))
    }

    fn status(&mut self, status: &StatusFields) -> bool {
        self.section(format_args!(
            "FSTrdl: {}|IOPr: {}mmHg|IrrPr: {}mmHg|Reflux: {}|CIrr: {}|FSPen: {}|AsPr: {}mmHg|LonPwr: {}%|TorAmp: {}%\nMC: {}\n",
            status.footswitch_treadle_range,
            status.iop,
            status.irrigation_pressure,
            if status.reflux_active { "Active" } else { "Inactive" },
            if status.continuous_irrigation { "Active" } else { "Not Active" },
            status.range_penetration,
            status.aspiration_pressure,
            status.uls_longitudinal_power,
            status.uls_torsional_amplitude,
            status.message_counter
        ))
    }
}

/// Render a decoded frame into its report.
pub fn render(decoded: &DecodedFrame) -> Report {
    let mut builder = ReportBuilder::new();

    let mut fits =
        builder.tag(decoded.class) && builder.metadata(&decoded.link, decoded.payload_size);
    if let Some(beacon) = decoded.beacon.as_ref().filter(|_| fits) {
        fits = builder.beacon(beacon);
    }
    if let Some(config) = decoded.config.as_ref().filter(|_| fits) {
        fits = builder.config(config);
    }
    if let Some(status) = decoded.status.as_ref().filter(|_| fits) {
        builder.status(status);
    }

    let report = builder.finish();
    if let Some(err) = report.truncation() {
        warn!("{}", err);
    }
    report
}
