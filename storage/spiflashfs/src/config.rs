use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Read timeout while the chip is being erased and initialized.
    pub erase_timeout: Duration,
    /// Wait between status requests while the device is not ready.
    pub retry_interval: Duration,
    /// Give up after this many status requests without a usable status, or retry forever if None.
    /// At least one request is always sent, `Some(0)` behaves like `Some(1)`.
    pub max_status_requests: Option<u32>,
}

impl DriverConfig {
    /// Default read timeout for ordinary exchanges.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Erasing the chip takes a considerable amount of time.
    pub const ERASE_TIMEOUT: Duration = Duration::from_secs(300);
    pub const RETRY_INTERVAL: Duration = Duration::from_secs(1);

    pub const fn new() -> Self {
        Self {
            erase_timeout: Self::ERASE_TIMEOUT,
            retry_interval: Self::RETRY_INTERVAL,
            max_status_requests: None,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}
