use std::{path::PathBuf, process::ExitCode, thread, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use embedded_hal::delay::DelayNs;
use log::{error, info, warn};
use spiflashfs_driver::{
    serial::{SerialConfig, SerialTransport},
    delay_for, Directory, Driver, DriverConfig,
};

/// Upload every file in a directory to an SPIFlashFS device.
#[derive(Parser, Debug)]
#[command(name = "spiflashfs-upload", version, long_about = None)]
struct Args {
    /// Directory holding the files to upload
    input: PathBuf,

    /// Only upload files with this extension, e.g. "wav"
    #[arg(short, long)]
    extension: Option<String>,

    /// Serial device path
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    device: String,

    /// Serial baud rate
    #[arg(short, long, default_value_t = SerialConfig::DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Read timeout in seconds
    #[arg(long, default_value_t = DriverConfig::DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Read timeout in seconds while the chip is erased
    #[arg(long, default_value_t = DriverConfig::ERASE_TIMEOUT.as_secs())]
    erase_timeout: u64,

    /// Seconds between status requests while the device is not ready
    #[arg(long, default_value_t = DriverConfig::RETRY_INTERVAL.as_secs())]
    retry_interval: u64,

    /// Give up after this many status requests, retry forever if not set
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_status_requests: Option<u32>,

    /// Seconds to wait after opening the port, boards reset when the port opens
    #[arg(long, default_value_t = 2)]
    settle: u64,

    /// Log every byte exchanged with the device
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Args {
    fn serial_config(&self) -> SerialConfig {
        SerialConfig {
            timeout: Duration::from_secs(self.timeout),
            ..SerialConfig::new(self.device.clone(), self.baud)
        }
    }

    fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            erase_timeout: Duration::from_secs(self.erase_timeout),
            retry_interval: Duration::from_secs(self.retry_interval),
            max_status_requests: self.max_status_requests,
        }
    }

    fn directory(&self) -> Directory {
        let directory = Directory::new(&self.input);
        match &self.extension {
            Some(extension) => directory.with_extension(extension),
            None => directory,
        }
    }
}

/// Blocking delay on the current thread.
struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<bool> {
    let serial = args.serial_config();
    let transport = SerialTransport::open(&serial)
        .with_context(|| format!("unable to open serial port {}", serial.path))?;

    let mut delay = StdDelay;
    delay_for(&mut delay, Duration::from_secs(args.settle));

    let mut source = args.directory();
    let mut driver = Driver::new(transport, delay, args.driver_config());
    let report = driver
        .run(&mut source)
        .with_context(|| format!("upload from {} failed", args.input.display()))?;

    let complete = report.files.iter().filter(|file| file.is_complete()).count();
    info!(
        "{} of {} files written, {} bytes sent",
        complete,
        report.files.len(),
        report.bytes_sent()
    );
    for file in report.files.iter().filter(|file| !file.is_complete()) {
        warn!("{}: {} bytes not written", file.name, file.bytes_remaining);
    }
    if let Some(aborted) = &report.aborted {
        warn!("Upload aborted: {}", aborted);
    }

    Ok(report.is_success())
}
