use std::{error::Error as StdError, fmt, io};

use thiserror::Error;

use crate::Reply;

/// Errors that end the run.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("serial transport failed")]
    Transport(#[from] io::Error),

    #[error("unable to initialize the chip, last reply was {0}")]
    DeviceInit(Reply),

    #[error("ready state not received after {0} status requests")]
    NotReady(u32),

    #[error("unable to list input files")]
    Source(#[source] io::Error),
}

/// Errors that abort the file transfer phase.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid response {0} trying to create a new file")]
    CreateFile(Reply),

    #[error("invalid response {0} trying to set a new file's size")]
    FileSize(Reply),

    #[error("{name} is {length} bytes which does not fit the length header")]
    FileTooLarge { name: String, length: u64 },

    #[error("failed opening file {name}")]
    Open {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed reading file {name}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("serial transport failed")]
    Transport(#[from] io::Error),
}

/// Displays an error followed by each of its sources.
pub(crate) struct ErrorChain<'a>(pub &'a dyn StdError);

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(e) = source {
            write!(f, ": {}", e)?;
            source = e.source();
        }
        Ok(())
    }
}
