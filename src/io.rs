//! The byte source and byte sink contracts that readers and writers are layered over.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};

/// A pull-based source of bytes.
pub trait ByteSource {
    /// Fills as much of `buf` as the source can and returns how many bytes were written.
    ///
    /// A short count (including zero) means the source cannot supply more right now. Whether
    /// that is permanent is signaled by the source itself, not by this call.
    fn fill(&mut self, buf: &mut [u8]) -> usize;
}

/// A push-based sink of bytes.
pub trait ByteSink {
    /// Offers `bytes` to the sink. Returns whether the sink accepted them.
    ///
    /// A sink either accepts the whole slice or rejects it; there are no partial writes at this
    /// level.
    fn submit(&mut self, bytes: &[u8]) -> bool;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn fill(&mut self, buf: &mut [u8]) -> usize {
        (**self).fill(buf)
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    #[inline]
    fn submit(&mut self, bytes: &[u8]) -> bool {
        (**self).submit(bytes)
    }
}

/// Each fill consumes bytes from the front of the slice.
impl ByteSource for &[u8] {
    fn fill(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.len());
        let (lo, hi) = self.split_at(n);
        buf[..n].copy_from_slice(lo);
        *self = hi;
        n
    }
}

/// Each fill drains bytes from the front of the queue. Producers push onto the back.
impl ByteSource for VecDeque<u8> {
    fn fill(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.len());
        for (dst, src) in buf[..n].iter_mut().zip(self.drain(..n)) {
            *dst = src;
        }
        n
    }
}

/// Always accepts.
impl ByteSink for Vec<u8> {
    #[inline]
    fn submit(&mut self, bytes: &[u8]) -> bool {
        self.extend_from_slice(bytes);
        true
    }
}

/// Adapts a [`std::io::Read`] into a [`ByteSource`].
///
/// `fill` keeps calling `read` until the buffer is full or `read` returns 0. `Interrupted` is
/// retried. Any other error ends the fill early; the error is kept and can be retrieved with
/// [`IoSource::take_error`].
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
    error: Option<std::io::Error>,
}

impl<R: Read> IoSource<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self { inner, error: None }
    }

    /// Returns the last I/O error that cut a fill short, if any, and clears it.
    pub fn take_error(&mut self) -> Option<std::io::Error> {
        self.error.take()
    }

    /// Extracts the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn fill(&mut self, buf: &mut [u8]) -> usize {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!("read failed after {filled} of {} bytes: {e}", buf.len());
                    self.error = Some(e);
                    break;
                }
            }
        }
        filled
    }
}

/// Adapts a [`std::io::Write`] into a [`ByteSink`].
///
/// Each submission is a single `write_all`. A failed write returns `false`; the error is kept
/// and can be retrieved with [`IoSink::take_error`].
#[derive(Debug)]
pub struct IoSink<W> {
    inner: W,
    error: Option<std::io::Error>,
}

impl<W: Write> IoSink<W> {
    /// Wraps `inner`.
    pub fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    /// Returns the last I/O error that caused a rejection, if any, and clears it.
    pub fn take_error(&mut self) -> Option<std::io::Error> {
        self.error.take()
    }

    /// Extracts the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for IoSink<W> {
    fn submit(&mut self, bytes: &[u8]) -> bool {
        match self.inner.write_all(bytes) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("write of {} bytes failed: {e}", bytes.len());
                self.error = Some(e);
                false
            }
        }
    }
}

/// A sink that stores at most `capacity` bytes and rejects any submission that would exceed it.
#[derive(Clone, Debug)]
pub struct BoundedSink {
    buf: Vec<u8>,
    capacity: usize,
}

impl BoundedSink {
    /// Creates an empty sink that holds up to `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Bytes accepted so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Remaining room, in bytes.
    pub fn room(&self) -> usize {
        self.capacity - self.buf.len()
    }

    /// Extracts the accepted bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl ByteSink for BoundedSink {
    fn submit(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() > self.room() {
            log::trace!("sink full: rejecting {} bytes, {} free", bytes.len(), self.room());
            return false;
        }
        self.buf.extend_from_slice(bytes);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out at most `chunk` bytes per `read` call and fails once the data is exhausted.
    struct Trickle<'a> {
        data: &'a [u8],
        chunk: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.data.is_empty() {
                return Err(std::io::Error::new(ErrorKind::BrokenPipe, "gone"));
            }
            let n = buf.len().min(self.chunk).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn slice_source_partial_fill() {
        let mut src: &[u8] = &[1, 2, 3];
        let mut buf = [0u8; 2];
        assert_eq!(src.fill(&mut buf), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(src.fill(&mut buf), 1);
        assert_eq!(buf[0], 3);
        assert_eq!(src.fill(&mut buf), 0);
    }

    #[test]
    fn deque_source_drains_front() {
        let mut src: VecDeque<u8> = [9, 8, 7].into_iter().collect();
        let mut buf = [0u8; 2];
        assert_eq!(src.fill(&mut buf), 2);
        assert_eq!(buf, [9, 8]);
        src.push_back(6);
        assert_eq!(src.fill(&mut buf), 2);
        assert_eq!(buf, [7, 6]);
    }

    #[test]
    fn io_source_gathers_chunks_and_keeps_error() {
        let mut src = IoSource::new(Trickle {
            data: &[1, 2, 3, 4, 5],
            chunk: 2,
        });
        let mut buf = [0u8; 4];
        assert_eq!(src.fill(&mut buf), 4);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert!(src.take_error().is_none());

        assert_eq!(src.fill(&mut buf), 1);
        assert_eq!(src.take_error().map(|e| e.kind()), Some(ErrorKind::BrokenPipe));
        assert!(src.take_error().is_none());
    }

    #[test]
    fn bounded_sink_rejects_overflow() {
        let mut sink = BoundedSink::new(3);
        assert!(sink.submit(&[1, 2]));
        assert!(!sink.submit(&[3, 4]));
        assert!(sink.submit(&[3]));
        assert_eq!(sink.room(), 0);
        assert_eq!(sink.into_inner(), [1, 2, 3]);
    }

    #[test]
    fn io_sink_reports_failure() {
        let mut backing = [0u8; 2];
        let mut sink = IoSink::new(&mut backing[..]);
        assert!(sink.submit(&[7, 8]));
        assert!(!sink.submit(&[9]));
        assert_eq!(sink.take_error().map(|e| e.kind()), Some(ErrorKind::WriteZero));
        drop(sink);
        assert_eq!(backing, [7, 8]);
    }
}
