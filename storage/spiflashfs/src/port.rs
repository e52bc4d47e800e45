//! Timeout handling shared by byte stream transports.
//!
//! A stream read or write that fails with `TimedOut` is not an error for a
//! [`Transport`](crate::Transport): it yields the number of bytes moved so far.

#![cfg_attr(not(feature = "serialport"), allow(dead_code))]

use std::io::{self, Read, Write};

/// Write `bytes` once, returning 0 if the write timed out.
pub(crate) fn write_timeout<W: Write + ?Sized>(port: &mut W, bytes: &[u8]) -> io::Result<usize> {
    let written = loop {
        match port.write(bytes) {
            Ok(written) => break written,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => break 0,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    };
    port.flush()?;
    Ok(written)
}

/// Read until `buffer` is full, the stream ends or a read times out.
pub(crate) fn read_timeout<R: Read + ?Sized>(
    port: &mut R,
    buffer: &mut [u8],
) -> io::Result<usize> {
    let mut len = 0;
    while len < buffer.len() {
        match port.read(&mut buffer[len..]) {
            Ok(0) => break,
            Ok(n) => len += n,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Replays scripted results, `Ok(bytes)` hands out those bytes.
    struct ScriptedPort {
        reads: VecDeque<io::Result<Vec<u8>>>,
        writes: VecDeque<io::Result<usize>>,
        flushes: usize,
    }

    impl ScriptedPort {
        fn new() -> Self {
            Self {
                reads: VecDeque::new(),
                writes: VecDeque::new(),
                flushes: 0,
            }
        }

        fn read_ok(mut self, bytes: &[u8]) -> Self {
            self.reads.push_back(Ok(bytes.to_vec()));
            self
        }

        fn read_err(mut self, kind: io::ErrorKind) -> Self {
            self.reads.push_back(Err(kind.into()));
            self
        }

        fn write_result(mut self, result: io::Result<usize>) -> Self {
            self.writes.push_back(result);
            self
        }
    }

    impl Read for ScriptedPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let bytes = self.reads.pop_front().expect("unexpected read")?;
            buf[..bytes.len()].copy_from_slice(&bytes);
            Ok(bytes.len())
        }
    }

    impl Write for ScriptedPort {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.writes.pop_front().expect("unexpected write")
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn read_timeout_without_data_is_zero() {
        let mut port = ScriptedPort::new().read_err(io::ErrorKind::TimedOut);
        let mut buffer = [0; 1];

        assert_eq!(0, read_timeout(&mut port, &mut buffer).unwrap());
    }

    #[test]
    fn read_timeout_returns_partial_count() {
        // Given
        let mut port = ScriptedPort::new()
            .read_ok(&[1, 2])
            .read_err(io::ErrorKind::TimedOut);
        let mut buffer = [0; 4];

        // When
        let len = read_timeout(&mut port, &mut buffer).unwrap();

        // Then
        assert_eq!(2, len);
        assert_eq!([1, 2], buffer[..2]);
    }

    #[test]
    fn read_retries_when_interrupted() {
        let mut port = ScriptedPort::new()
            .read_ok(&[1])
            .read_err(io::ErrorKind::Interrupted)
            .read_ok(&[2, 3]);
        let mut buffer = [0; 3];

        assert_eq!(3, read_timeout(&mut port, &mut buffer).unwrap());
        assert_eq!([1, 2, 3], buffer);
        assert!(port.reads.is_empty());
    }

    #[test]
    fn read_propagates_other_errors() {
        let mut port = ScriptedPort::new().read_err(io::ErrorKind::BrokenPipe);
        let mut buffer = [0; 1];

        let result = read_timeout(&mut port, &mut buffer);

        assert_eq!(io::ErrorKind::BrokenPipe, result.unwrap_err().kind());
    }

    #[test]
    fn write_timeout_is_zero() {
        let mut port = ScriptedPort::new().write_result(Err(io::ErrorKind::TimedOut.into()));

        assert_eq!(0, write_timeout(&mut port, &[0x73]).unwrap());
        assert_eq!(1, port.flushes);
    }

    #[test]
    fn write_returns_partial_count() {
        let mut port = ScriptedPort::new().write_result(Ok(3));

        assert_eq!(3, write_timeout(&mut port, &[4, 0, 0, 0]).unwrap());
    }

    #[test]
    fn write_retries_when_interrupted() {
        let mut port = ScriptedPort::new()
            .write_result(Err(io::ErrorKind::Interrupted.into()))
            .write_result(Ok(1));

        assert_eq!(1, write_timeout(&mut port, &[0x66]).unwrap());
        assert!(port.writes.is_empty());
    }

    #[test]
    fn write_propagates_other_errors() {
        let mut port = ScriptedPort::new().write_result(Err(io::ErrorKind::BrokenPipe.into()));

        let result = write_timeout(&mut port, &[0x66]);

        assert_eq!(io::ErrorKind::BrokenPipe, result.unwrap_err().kind());
    }
}
