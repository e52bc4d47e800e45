use crate::{TransferError, CHUNK_SIZE};

/// Progress of a single file transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferSession {
    total_length: u32,
    bytes_sent: u32,
    chunks: u32,
}

impl TransferSession {
    pub const fn new(total_length: u32) -> Self {
        Self {
            total_length,
            bytes_sent: 0,
            chunks: 0,
        }
    }

    pub const fn total_length(&self) -> u32 {
        self.total_length
    }

    pub const fn bytes_sent(&self) -> u32 {
        self.bytes_sent
    }

    pub const fn bytes_remaining(&self) -> u32 {
        self.total_length - self.bytes_sent
    }

    pub const fn chunks(&self) -> u32 {
        self.chunks
    }

    /// Size of the next chunk to send.
    pub fn next_chunk_len(&self) -> usize {
        usize::min(self.bytes_remaining() as usize, CHUNK_SIZE)
    }

    /// Record that a chunk of `len` bytes was sent.
    pub fn advance(&mut self, len: usize) {
        assert!(len <= self.next_chunk_len());
        self.bytes_sent += len as u32;
        self.chunks += 1;
    }

    pub const fn is_complete(&self) -> bool {
        self.bytes_remaining() < 1
    }

    pub fn finish(self, name: &str, short_header: bool) -> FileOutcome {
        FileOutcome {
            name: name.into(),
            length: self.total_length,
            bytes_sent: self.bytes_sent,
            bytes_remaining: self.bytes_remaining(),
            chunks: self.chunks,
            short_header,
        }
    }
}

/// The result of transferring a single file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileOutcome {
    pub name: String,
    pub length: u32,
    pub bytes_sent: u32,
    pub bytes_remaining: u32,
    /// Number of chunk writes issued.
    pub chunks: u32,
    /// The length header was not written completely.
    pub short_header: bool,
}

impl FileOutcome {
    pub const fn is_complete(&self) -> bool {
        self.bytes_remaining < 1
    }
}

/// The result of the file transfer phase.
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Files in the order they were transferred.
    pub files: Vec<FileOutcome>,
    /// The error that aborted the phase, if any. Files after it were skipped.
    pub aborted: Option<TransferError>,
}

impl UploadReport {
    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && self.files.iter().all(FileOutcome::is_complete)
    }

    pub fn bytes_sent(&self) -> u64 {
        self.files.iter().map(|file| file.bytes_sent as u64).sum()
    }
}
