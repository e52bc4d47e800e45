//! Serial port [`Transport`] backed by the `serialport` crate.

use std::{io, time::Duration};

pub use serialport::{DataBits, Parity, StopBits};
use serialport::SerialPort;

use crate::{
    port::{read_timeout, write_timeout},
    DriverConfig, Transport,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerialConfig {
    pub path: String,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    /// Read timeout for ordinary exchanges.
    pub timeout: Duration,
}

impl SerialConfig {
    pub const DEFAULT_BAUD_RATE: u32 = 115_200;

    /// 8N1 at the given baud rate with the default timeout.
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            timeout: DriverConfig::DEFAULT_TIMEOUT,
        }
    }
}

pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    pub fn open(config: &SerialConfig) -> Result<Self, serialport::Error> {
        let port = serialport::new(&config.path, config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .timeout(config.timeout)
            .open()?;

        info!("Opened {} at {} baud", config.path, config.baud_rate);
        Ok(Self::new(port))
    }

    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        write_timeout(&mut *self.port, bytes)
    }

    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        read_timeout(&mut *self.port, buffer)
    }

    fn timeout(&self) -> Duration {
        self.port.timeout()
    }

    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.port.set_timeout(timeout)?;
        Ok(())
    }
}
