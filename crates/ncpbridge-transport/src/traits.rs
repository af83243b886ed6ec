use std::io::{ErrorKind, Read, Write};

use crate::error::{Result, TransportError};

/// A non-blocking, in-order, lossless byte link (UART, socket, in-memory pipe).
///
/// Neither operation may block. Returning `Ok(0)` means "nothing right now"
/// and the caller simply retries on its next polling cycle.
pub trait SerialLink {
    /// Copy whatever bytes are currently available into `buf`.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Offer `buf` to the link and return how many leading bytes it accepted.
    fn write_some(&mut self, buf: &[u8]) -> Result<usize>;
}

impl<L: SerialLink + ?Sized> SerialLink for &mut L {
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read_available(buf)
    }

    fn write_some(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write_some(buf)
    }
}

impl<L: SerialLink + ?Sized> SerialLink for Box<L> {
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read_available(buf)
    }

    fn write_some(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write_some(buf)
    }
}

/// Adapts a non-blocking `Read + Write` stream into a [`SerialLink`].
///
/// `WouldBlock` and `Interrupted` become zero-byte transfers; end-of-stream
/// on read and a zero-length write become [`TransportError::Closed`].
#[derive(Debug)]
pub struct StreamLink<T> {
    inner: T,
}

impl<T: Read + Write> StreamLink<T> {
    /// Wrap a stream that has already been put in non-blocking mode.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the link and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + Write> SerialLink for StreamLink<T> {
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.inner.read(buf) {
            Ok(0) => Err(TransportError::Closed),
            Ok(n) => Ok(n),
            Err(err) if is_transient(&err) => Ok(0),
            Err(err) => Err(TransportError::Io(err)),
        }
    }

    fn write_some(&mut self, buf: &[u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.inner.write(buf) {
            Ok(0) => Err(TransportError::Closed),
            Ok(n) => {
                if let Err(err) = self.inner.flush() {
                    if !is_transient(&err) {
                        return Err(TransportError::Io(err));
                    }
                }
                Ok(n)
            }
            Err(err) if is_transient(&err) => Ok(0),
            Err(err) => Err(TransportError::Io(err)),
        }
    }
}

fn is_transient(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted)
}
