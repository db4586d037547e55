//! ScannerBuilder -- fluent builder for constructing [`UnidenScanner`] sessions.
//!
//! Separates configuration from construction so that callers can set up
//! serial port parameters, retry policies, and timeout values before
//! opening the port.
//!
//! # Example
//!
//! ```no_run
//! use scanlib_uniden::builder::ScannerBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> scanlib_core::Result<()> {
//! let scanner = ScannerBuilder::new()
//!     .serial_port("/dev/ttyACM0")
//!     .command_timeout(Duration::from_millis(300))
//!     .build()
//!     .await?;
//! println!("{}", scanner.model().await?);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use scanlib_core::error::{Error, Result};
use scanlib_core::transport::Transport;
use scanlib_transport::{SerialConfig, SerialTransport};

use crate::scanner::UnidenScanner;

/// Default serial speed of the BC125AT's USB port.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Fluent builder for [`UnidenScanner`].
#[derive(Debug, Clone)]
pub struct ScannerBuilder {
    serial_port: Option<String>,
    baud_rate: u32,
    auto_retry: bool,
    max_retries: u32,
    command_timeout: Duration,
}

impl ScannerBuilder {
    pub fn new() -> Self {
        ScannerBuilder {
            serial_port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            auto_retry: true,
            max_retries: 2,
            command_timeout: Duration::from_millis(500),
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyACM0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Enable or disable automatic retry on timeout.
    pub fn auto_retry(mut self, enabled: bool) -> Self {
        self.auto_retry = enabled;
        self
    }

    /// Set the maximum number of retry attempts (default: 2).
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set how long to wait for the reply to a single command
    /// (default: 500ms).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Build an [`UnidenScanner`] with a caller-provided transport.
    ///
    /// This is the entry point for tests (pass a `MockTransport` or
    /// `SimulatedScanner` from `scanlib-test-harness`).
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<UnidenScanner> {
        if self.command_timeout.is_zero() {
            return Err(Error::InvalidParameter(
                "command_timeout must be greater than zero".into(),
            ));
        }

        Ok(UnidenScanner::new(
            transport,
            self.auto_retry,
            self.max_retries,
            self.command_timeout,
        ))
    }

    /// Build an [`UnidenScanner`] on a serial port.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    pub async fn build(self) -> Result<UnidenScanner> {
        let port = self
            .serial_port
            .as_ref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;

        let config = SerialConfig::with_baud_rate(self.baud_rate);
        let transport = SerialTransport::open_with_config(port, config).await?;
        self.build_with_transport(Box::new(transport)).await
    }
}

impl Default for ScannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
