use core::fmt;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// The known status values a device replies with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive)]
pub enum Status {
    /// The chip holds no valid filesystem
    Uninitialized = 0x01,
    /// The filesystem is ready for a new request
    Ready = 0x64,
    /// The device expects more file data
    AcceptingData = 0x65,
}

/// A single raw byte received from the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusByte(pub u8);

impl StatusByte {
    /// Decode the byte, or None if it is not a known status.
    pub fn status(self) -> Option<Status> {
        Status::from_u8(self.0)
    }
}

/// The outcome of a single request/response exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    /// A byte was received
    Byte(StatusByte),
    /// No byte arrived before the transport timeout
    Timeout,
    /// The request could not be written
    WriteFailed,
}

impl Reply {
    pub fn status(self) -> Option<Status> {
        match self {
            Reply::Byte(byte) => byte.status(),
            Reply::Timeout | Reply::WriteFailed => None,
        }
    }

    pub fn is(self, status: Status) -> bool {
        self.status() == Some(status)
    }
}

impl From<Status> for Reply {
    fn from(value: Status) -> Self {
        Reply::Byte(StatusByte(value as u8))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Byte(byte) => match byte.status() {
                Some(Status::Uninitialized) => write!(f, "{} (uninitialized)", byte.0),
                Some(Status::Ready) => write!(f, "{} (ready)", byte.0),
                Some(Status::AcceptingData) => write!(f, "{} (accepting data)", byte.0),
                None => write!(f, "{}", byte.0),
            },
            Reply::Timeout => write!(f, "timeout"),
            Reply::WriteFailed => write!(f, "write failure"),
        }
    }
}
