//! Report delivery to the diagnostic console

use std::io::{self, Write};

/// Byte sink that forwards reports to the console.
///
/// Writes are best effort: an implementation accepts as many bytes as it can
/// without blocking and reports how many that was. The pipeline never retries
/// the remainder.
pub trait Transport: Send + 'static {
    /// Offer `bytes` to the sink, returning how many were accepted.
    fn write_nonblocking(&mut self, bytes: &[u8]) -> io::Result<usize>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_nonblocking(&mut self, bytes: &[u8]) -> io::Result<usize> {
        (**self).write_nonblocking(bytes)
    }
}

/// Transport over any [`Write`] sink (serial port, stdout, socket).
///
/// Issues a single `write` per report, so partial acceptance by the sink
/// surfaces as a short write instead of being retried. The transport never
/// calls `flush`; buffering is left to the sink.
#[derive(Debug)]
pub struct WriterTransport<W> {
    inner: W,
}

impl<W: Write + Send + 'static> WriterTransport<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send + 'static> Transport for WriterTransport<W> {
    fn write_nonblocking(&mut self, bytes: &[u8]) -> io::Result<usize> {
        match self.inner.write(bytes) {
            Ok(n) => Ok(n),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(err) => Err(err),
        }
    }
}

/// In-memory transport, optionally accepting at most `limit` bytes per write.
///
/// Useful for capturing reports and for simulating a saturated console FIFO.
#[derive(Debug, Default, Clone)]
pub struct BufferTransport {
    accepted: Vec<u8>,
    limit: Option<usize>,
    writes: usize,
}

impl BufferTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept at most `limit` bytes per write.
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit), ..Self::default() }
    }

    /// Everything accepted so far
    pub fn contents(&self) -> &[u8] {
        &self.accepted
    }

    /// Accepted bytes as text (reports are ASCII)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.accepted).into_owned()
    }

    /// Number of write calls received
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn clear(&mut self) {
        self.accepted.clear();
        self.writes = 0;
    }
}

impl Transport for BufferTransport {
    fn write_nonblocking(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let take = self.limit.map_or(bytes.len(), |limit| bytes.len().min(limit));
        self.accepted.extend_from_slice(&bytes[..take]);
        self.writes += 1;
        Ok(take)
    }
}
