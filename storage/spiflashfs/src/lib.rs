// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

mod config;
mod delay;
mod driver;
mod error;
mod opcode;
mod port;
mod session;
pub mod source;
mod statusbyte;
pub mod traits;

#[cfg(feature = "serialport")]
pub mod serial;

/// The largest number of file bytes sent before waiting for an acknowledgement.
pub const CHUNK_SIZE: usize = 256;

/// Size of the little endian length header sent after a file is created.
pub const LENGTH_HEADER_SIZE: usize = 4;

pub use self::{
    config::DriverConfig,
    delay::delay_for,
    driver::Driver,
    error::{DriverError, TransferError},
    opcode::Command,
    session::{FileOutcome, TransferSession, UploadReport},
    source::{Directory, FileSource},
    statusbyte::{Reply, Status, StatusByte},
    traits::{TimeoutGuard, Transport},
};

#[cfg(test)]
mod serial_mock;
