use std::io::{self, Read};

use embedded_hal::delay::DelayNs;

use crate::{
    delay::delay_for,
    error::ErrorChain,
    source::FileSource,
    traits::{TimeoutGuard, Transport},
    Command, DriverConfig, DriverError, FileOutcome, Reply, Status, StatusByte, TransferError,
    TransferSession, UploadReport, CHUNK_SIZE, LENGTH_HEADER_SIZE,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    CheckStatus,
    Initializing,
    Transferring,
}

/// Counts status requests that did not report a usable status.
struct StatusPoll {
    requests: u32,
    max: Option<u32>,
}

impl StatusPoll {
    const fn new(max: Option<u32>) -> Self {
        Self { requests: 0, max }
    }

    /// Record another unusable reply, true once the limit is reached.
    fn exhausted(&mut self) -> bool {
        self.requests = self.requests.saturating_add(1);
        matches!(self.max, Some(max) if self.requests >= max)
    }
}

pub struct Driver<T: Transport, Delay: DelayNs> {
    transport: T,
    delay: Delay,
    config: DriverConfig,
}

impl<T: Transport, Delay: DelayNs> Driver<T, Delay> {
    pub const fn new(transport: T, delay: Delay, config: DriverConfig) -> Self {
        Self {
            transport,
            delay,
            config,
        }
    }

    pub fn release(self) -> (T, Delay) {
        (self.transport, self.delay)
    }

    /// Send a single command byte and wait for the single byte reply.
    pub fn send_byte(&mut self, command: Command) -> io::Result<Reply> {
        exchange(&mut self.transport, command)
    }

    /// Request the current device status.
    pub fn status(&mut self) -> io::Result<Reply> {
        self.send_byte(Command::GetStatus)
    }

    /// Erase the chip and write an empty filesystem.
    ///
    /// The transport timeout is raised to `erase_timeout` while the device works,
    /// and is restored before this returns.
    pub fn initialize(&mut self) -> Result<(), DriverError> {
        info!("Chip is uninitialized, erasing");

        let reply = {
            let mut transport = TimeoutGuard::new(&mut self.transport, self.config.erase_timeout)?;
            let reply = exchange(&mut *transport, Command::EraseChip)?;
            if reply.is(Status::Uninitialized) {
                exchange(&mut *transport, Command::InitFilesystem)?
            } else {
                reply
            }
        };

        if reply.is(Status::Ready) {
            info!("Chip initialized");
            Ok(())
        } else {
            error!("Unable to initialize the chip");
            Err(DriverError::DeviceInit(reply))
        }
    }

    /// Poll the device until it is ready, initializing the chip if needed,
    /// and then upload every file in `source` once.
    pub fn run<S: FileSource>(&mut self, source: &mut S) -> Result<UploadReport, DriverError> {
        let mut state = State::CheckStatus;
        let mut poll = StatusPoll::new(self.config.max_status_requests);

        loop {
            state = match state {
                State::CheckStatus => {
                    let reply = self.status()?;

                    match reply.status() {
                        Some(Status::Uninitialized) => State::Initializing,
                        Some(Status::Ready) => State::Transferring,
                        _ => {
                            if poll.exhausted() {
                                return Err(DriverError::NotReady(poll.requests));
                            }

                            warn!("Ready state not yet received ({}), will retry", reply);
                            delay_for(&mut self.delay, self.config.retry_interval);
                            State::CheckStatus
                        }
                    }
                }
                State::Initializing => {
                    self.initialize()?;
                    State::CheckStatus
                }
                State::Transferring => return self.upload(source),
            };
        }
    }

    /// Upload all files in `source` in name order.
    ///
    /// The first failing file aborts the upload, the error is returned in the report.
    pub fn upload<S: FileSource>(&mut self, source: &mut S) -> Result<UploadReport, DriverError> {
        let names = source.names().map_err(DriverError::Source)?;
        let mut report = UploadReport::default();

        for name in names {
            let result = match source.open(&name) {
                Ok((length, mut reader)) => {
                    info!("Opening file {} ({})", name, length);
                    self.upload_file(&name, length, &mut reader)
                }
                Err(source) => Err(TransferError::Open { name, source }),
            };

            match result {
                Ok(outcome) => report.files.push(outcome),
                Err(e) => {
                    error!("{}", ErrorChain(&e));
                    report.aborted = Some(e);
                    break;
                }
            }
        }

        Ok(report)
    }

    /// Create a new file on the device and stream `length` bytes from `reader` into it.
    ///
    /// A file shorter than `length`, or a chunk that is not acknowledged,
    /// results in an incomplete [`FileOutcome`] rather than an error.
    pub fn upload_file<R: Read>(
        &mut self,
        name: &str,
        length: u64,
        reader: &mut R,
    ) -> Result<FileOutcome, TransferError> {
        let length = u32::try_from(length).map_err(|_| TransferError::FileTooLarge {
            name: name.into(),
            length,
        })?;

        let reply = self.send_byte(Command::CreateFile)?;
        if !reply.is(Status::Ready) {
            return Err(TransferError::CreateFile(reply));
        }

        debug!("Sending: {}", length);
        let header = length.to_le_bytes();
        let written = self.transport.write(&header)?;
        let short_header = written != LENGTH_HEADER_SIZE;
        if short_header {
            warn!(
                "Sent {} bytes when intending to send {}",
                written, LENGTH_HEADER_SIZE
            );
        }

        let mut reply = read_reply(&mut self.transport)?;
        if !reply.is(Status::AcceptingData) {
            return Err(TransferError::FileSize(reply));
        }

        let mut session = TransferSession::new(length);
        let mut chunk = [0; CHUNK_SIZE];

        while reply.is(Status::AcceptingData) {
            let buffer = &mut chunk[..session.next_chunk_len()];
            let len = fill(reader, buffer).map_err(|source| TransferError::Read {
                name: name.into(),
                source,
            })?;

            if len == 0 {
                info!("End of file reached");
                break;
            }

            let written = self.transport.write(&buffer[..len])?;
            if written != len {
                warn!("Sent {} bytes when intending to send {}", written, len);
            }

            session.advance(len);
            trace!(
                "{} bytes sent, {} remaining",
                session.bytes_sent(),
                session.bytes_remaining()
            );

            reply = read_reply(&mut self.transport)?;
            match reply.status() {
                Some(Status::AcceptingData) | Some(Status::Ready) => {}
                None if reply == Reply::Timeout => warn!("Timeout"),
                _ => {
                    error!("Error received via the serial connection: {}", reply);
                    break;
                }
            }
        }

        if session.is_complete() {
            info!("{} bytes sent", session.bytes_sent());
            info!("Finished writing file {}", name);
        } else {
            warn!(
                "Incomplete file write. {} bytes not written",
                session.bytes_remaining()
            );
        }

        Ok(session.finish(name, short_header))
    }
}

fn exchange<T: Transport>(transport: &mut T, command: Command) -> io::Result<Reply> {
    debug!("Sending: {} ({})", command.as_u8(), command.name());

    if transport.write(&[command.as_u8()])? == 0 {
        error!("Failed to write to serial connection");
        return Ok(Reply::WriteFailed);
    }

    read_reply(transport)
}

fn read_reply<T: Transport>(transport: &mut T) -> io::Result<Reply> {
    let mut byte = [0];
    if transport.read(&mut byte)? == 0 {
        debug!("Timeout");
        return Ok(Reply::Timeout);
    }

    debug!("Received: {}", byte[0]);
    Ok(Reply::Byte(StatusByte(byte[0])))
}

/// Read until `buffer` is full or the reader is exhausted.
fn fill<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut len = 0;
    while len < buffer.len() {
        match reader.read(&mut buffer[len..]) {
            Ok(0) => break,
            Ok(n) => len += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(len)
}
