use std::{
    io,
    ops::{Deref, DerefMut},
    time::Duration,
};

#[cfg(test)]
use mockall::automock;

/// A timeout bounded byte channel to the device.
#[cfg_attr(test, automock)]
pub trait Transport {
    /// Write bytes, returning how many were accepted. `Ok(0)` means nothing could be written.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Read up to `buffer.len()` bytes, waiting at most the current timeout.
    /// Returns the number of bytes received before the deadline, `Ok(0)` on timeout.
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize>;

    fn timeout(&self) -> Duration;

    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        (**self).write(bytes)
    }

    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        (**self).read(buffer)
    }

    fn timeout(&self) -> Duration {
        (**self).timeout()
    }

    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        (**self).set_timeout(timeout)
    }
}

/// Temporarily replaces the transport timeout.
/// The previous timeout is restored when the guard is dropped.
pub struct TimeoutGuard<'a, T: Transport> {
    transport: &'a mut T,
    previous: Duration,
}

impl<'a, T: Transport> TimeoutGuard<'a, T> {
    pub fn new(transport: &'a mut T, timeout: Duration) -> io::Result<Self> {
        let previous = transport.timeout();
        transport.set_timeout(timeout)?;
        debug!("Timeout raised from {:?} to {:?}", previous, timeout);
        Ok(Self {
            transport,
            previous,
        })
    }
}

impl<T: Transport> Deref for TimeoutGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.transport
    }
}

impl<T: Transport> DerefMut for TimeoutGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.transport
    }
}

impl<T: Transport> Drop for TimeoutGuard<'_, T> {
    fn drop(&mut self) {
        match self.transport.set_timeout(self.previous) {
            Ok(()) => debug!("Timeout restored to {:?}", self.previous),
            Err(e) => error!("Unable to restore timeout to {:?}: {}", self.previous, e),
        }
    }
}
