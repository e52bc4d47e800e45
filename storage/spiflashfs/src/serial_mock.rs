use std::{collections::VecDeque, io, time::Duration};

use crate::{Command, Status, Transport};

/// A scripted serial link. Every read pops the next scripted reply byte,
/// an exhausted or `None` entry behaves as a read timeout.
pub struct SerialMock {
    replies: VecDeque<Option<u8>>,
    /// Limit the number of bytes accepted by the write with this index.
    write_limits: Vec<(usize, usize)>,
    timeout: Duration,
    pub writes: Vec<Vec<u8>>,
    /// The timeout in effect for each read.
    pub read_timeouts: Vec<Duration>,
}

impl SerialMock {
    pub fn new() -> Self {
        Self {
            replies: VecDeque::new(),
            write_limits: Vec::new(),
            timeout: Duration::from_secs(10),
            writes: Vec::new(),
            read_timeouts: Vec::new(),
        }
    }

    pub fn reply(mut self, status: Status) -> Self {
        self.replies.push_back(Some(status as u8));
        self
    }

    pub fn reply_byte(mut self, byte: u8) -> Self {
        self.replies.push_back(Some(byte));
        self
    }

    pub fn reply_timeout(mut self) -> Self {
        self.replies.push_back(None);
        self
    }

    pub fn limit_write(mut self, index: usize, len: usize) -> Self {
        self.write_limits.push((index, len));
        self
    }

    pub fn commands(&self) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|write| write.len() == 1)
            .map(|write| write[0])
            .collect()
    }

    pub fn count(&self, command: Command) -> usize {
        self.writes
            .iter()
            .filter(|write| write.as_slice() == [command.as_u8()])
            .count()
    }

    /// All writes following the create file request with the given index.
    pub fn file_writes(&self, file: usize) -> Vec<Vec<u8>> {
        self.writes
            .iter()
            .enumerate()
            .filter(|(_, write)| write.as_slice() == [Command::CreateFile.as_u8()])
            .nth(file)
            .map(|(start, _)| {
                self.writes[start + 1..]
                    .iter()
                    .take_while(|write| write.as_slice() != [Command::CreateFile.as_u8()])
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Transport for SerialMock {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let index = self.writes.len();
        let len = self
            .write_limits
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, len)| usize::min(*len, bytes.len()))
            .unwrap_or(bytes.len());
        self.writes.push(bytes[..len].to_vec());
        Ok(len)
    }

    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        assert_eq!(1, buffer.len());
        self.read_timeouts.push(self.timeout);
        match self.replies.pop_front().flatten() {
            Some(byte) => {
                buffer[0] = byte;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.timeout = timeout;
        Ok(())
    }
}
