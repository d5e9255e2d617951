//! Pass-through adapters that drive a [`ProgressStream`] from std I/O and iterators.
//!
//! The adapters never copy or buffer data beyond what the wrapped reader or
//! writer does. They count what flows through and translate end-of-stream and
//! errors into [`ProgressStream::finish`] and [`ProgressStream::fail`].

use std::io::{self, ErrorKind, Read, Write};

use crate::clock::{Clock, MonotonicClock};
use crate::error::ProgressError;
use crate::progress::ProgressStream;

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// [`Read`] wrapper that counts every byte read and finishes the stream at EOF.
pub struct ProgressReader<'a, R, C = MonotonicClock> {
    inner: R,
    stream: &'a mut ProgressStream<C>,
}

impl<'a, R, C> ProgressReader<'a, R, C> {
    pub fn new(inner: R, stream: &'a mut ProgressStream<C>) -> Self {
        Self { inner, stream }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read, C: Clock> Read for ProgressReader<'_, R, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(0) => {
                if !buf.is_empty() {
                    self.stream.finish();
                }
                Ok(0)
            }
            Ok(n) => {
                self.stream.transform(&buf[..n]);
                Ok(n)
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => Err(e),
            Err(e) => {
                self.stream.fail(&e);
                Err(e)
            }
        }
    }
}

/// [`Write`] wrapper that counts the bytes the inner writer accepts.
///
/// Call [`ProgressWriter::finish`] for the final 100% snapshot; dropping the
/// writer leaves the stream unfinished. In drain mode a closed pipe
/// downstream turns the writer into a counting sink.
pub struct ProgressWriter<'a, W, C = MonotonicClock> {
    inner: W,
    stream: &'a mut ProgressStream<C>,
    discarding: bool,
}

impl<'a, W, C> ProgressWriter<'a, W, C> {
    pub fn new(inner: W, stream: &'a mut ProgressStream<C>) -> Self {
        Self {
            inner,
            stream,
            discarding: false,
        }
    }
}

impl<W: Write, C: Clock> ProgressWriter<'_, W, C> {
    /// Flush the inner writer, finish the stream and return the writer.
    pub fn finish(mut self) -> io::Result<W> {
        if !self.discarding {
            if let Err(e) = self.inner.flush() {
                self.stream.fail(&e);
                return Err(e);
            }
        }
        self.stream.finish();
        Ok(self.inner)
    }
}

impl<W: Write, C: Clock> Write for ProgressWriter<'_, W, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.discarding {
            return Ok(self.stream.transform(buf).len());
        }
        match self.inner.write(buf) {
            Ok(n) => {
                self.stream.transform(&buf[..n]);
                Ok(n)
            }
            Err(e) if e.kind() == ErrorKind::BrokenPipe && self.stream.drain() => {
                tracing::debug!("downstream closed, draining");
                self.discarding = true;
                Ok(self.stream.transform(buf).len())
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => Err(e),
            Err(e) => {
                self.stream.fail(&e);
                Err(e)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.discarding {
            return Ok(());
        }
        self.inner.flush()
    }
}

impl<C: Clock> ProgressStream<C> {
    /// Copy `reader` into `writer` through this stream, `chunk_size` bytes at a time.
    ///
    /// Finishes the stream at EOF and returns the number of bytes read. In
    /// drain mode a closed downstream pipe does not stop the copy.
    pub fn pump<R: Read, W: Write>(
        &mut self,
        mut reader: R,
        mut writer: W,
        chunk_size: usize,
    ) -> Result<u64, ProgressError> {
        let mut buf = vec![0u8; chunk_size.max(1)];
        let mut copied = 0u64;
        let mut discarding = false;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.fail(&e);
                    return Err(e.into());
                }
            };
            let chunk = self.transform(&buf[..n]);
            copied += n as u64;
            if discarding {
                continue;
            }
            if let Err(e) = writer.write_all(chunk) {
                if e.kind() == ErrorKind::BrokenPipe && self.drain() {
                    tracing::debug!(copied, "downstream closed, draining");
                    discarding = true;
                    continue;
                }
                self.fail(&e);
                return Err(e.into());
            }
        }
        if !discarding {
            if let Err(e) = writer.flush() {
                self.fail(&e);
                return Err(e.into());
            }
        }
        self.finish();
        Ok(copied)
    }

    /// Consume `reader` to the end, discarding the data.
    pub fn drain_from<R: Read>(&mut self, reader: R, chunk_size: usize) -> Result<u64, ProgressError> {
        self.pump(reader, io::sink(), chunk_size)
    }
}

/// Iterator adapter counting one unit per item; finishes the stream when exhausted.
///
/// Finishing happens inside `next`, so when items go on to a writer that can
/// still fail, count with [`ProgressStream::transform`] and finish after the flush.
pub struct ProgressIter<'a, I, C = MonotonicClock> {
    iter: I,
    stream: &'a mut ProgressStream<C>,
}

impl<I: Iterator, C: Clock> Iterator for ProgressIter<'_, I, C> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.iter.next() {
            Some(item) => Some(self.stream.transform_item(item)),
            None => {
                self.stream.finish();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Attach a [`ProgressStream`] to any iterator.
pub trait ProgressIteratorExt: Iterator + Sized {
    fn track<C: Clock>(self, stream: &mut ProgressStream<C>) -> ProgressIter<'_, Self, C>;
}

impl<I: Iterator> ProgressIteratorExt for I {
    fn track<C: Clock>(self, stream: &mut ProgressStream<C>) -> ProgressIter<'_, Self, C> {
        ProgressIter { iter: self, stream }
    }
}
