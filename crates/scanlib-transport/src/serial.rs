//! Serial port transport for scanner communication.
//!
//! This module provides [`SerialTransport`], which implements the [`Transport`]
//! trait for the USB virtual COM port a handheld scanner presents when it is
//! plugged into a computer. Uniden handhelds speak 8N1 with no flow control;
//! the BC125AT accepts 115200 baud.
//!
//! # Example
//!
//! ```no_run
//! use scanlib_transport::SerialTransport;
//! use scanlib_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> scanlib_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/ttyACM0", 115_200).await?;
//!
//! // Ask for the model name.
//! transport.send(b"MDL\r").await?;
//!
//! let mut buf = [0u8; 64];
//! let n = transport.receive(&mut buf, Duration::from_millis(500)).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use scanlib_core::error::{Error, Result};
use scanlib_core::transport::Transport;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialPortType, SerialStream};

/// USB vendor ID assigned to Uniden America.
pub const UNIDEN_USB_VID: u16 = 0x1965;

/// Serial port configuration.
///
/// Defaults match the Uniden handheld USB interface: 115200 baud, 8 data
/// bits, 1 stop bit, no parity, no flow control.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Baud rate (e.g. 57600, 115200)
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
        }
    }
}

impl SerialConfig {
    /// Default line settings at a different baud rate.
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Default::default()
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Seven,
    Eight,
}

impl From<DataBits> for tokio_serial::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Seven => tokio_serial::DataBits::Seven,
            DataBits::Eight => tokio_serial::DataBits::Eight,
        }
    }
}

/// Number of stop bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

impl From<StopBits> for tokio_serial::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => tokio_serial::StopBits::One,
            StopBits::Two => tokio_serial::StopBits::Two,
        }
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for tokio_serial::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => tokio_serial::Parity::None,
            Parity::Odd => tokio_serial::Parity::Odd,
            Parity::Even => tokio_serial::Parity::Even,
        }
    }
}

/// Flow control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    None,
    Hardware,
}

impl From<FlowControl> for tokio_serial::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => tokio_serial::FlowControl::None,
            FlowControl::Hardware => tokio_serial::FlowControl::Hardware,
        }
    }
}

/// List serial ports that belong to a Uniden USB device.
///
/// Useful when the user does not name a port: a single match can be opened
/// directly.
pub fn find_scanner_ports() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports()
        .map_err(|e| Error::Transport(format!("cannot enumerate serial ports: {e}")))?;

    Ok(ports
        .into_iter()
        .filter(|p| matches!(&p.port_type, SerialPortType::UsbPort(usb) if usb.vid == UNIDEN_USB_VID))
        .map(|p| p.port_name)
        .collect())
}

/// Broken pipes and vanished devices mean the scanner was unplugged.
fn map_io_error(e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::NotConnected => Error::ConnectionLost,
        _ => Error::Io(e),
    }
}

/// Serial port transport for scanner communication.
pub struct SerialTransport {
    port: Option<SerialStream>,
    /// Kept for log fields after the port is closed.
    port_name: String,
}

impl SerialTransport {
    /// Open a serial port at `baud_rate` with default 8N1 settings.
    ///
    /// ```no_run
    /// # use scanlib_transport::SerialTransport;
    /// # async fn example() -> scanlib_core::Result<()> {
    /// let transport = SerialTransport::open("/dev/ttyACM0", 115_200).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open(port: &str, baud_rate: u32) -> Result<Self> {
        Self::open_with_config(port, SerialConfig::with_baud_rate(baud_rate)).await
    }

    /// Open a serial port with full configuration control.
    pub async fn open_with_config(port: &str, config: SerialConfig) -> Result<Self> {
        tracing::debug!(
            port = %port,
            baud_rate = config.baud_rate,
            data_bits = ?config.data_bits,
            stop_bits = ?config.stop_bits,
            parity = ?config.parity,
            flow_control = ?config.flow_control,
            "Opening serial port"
        );

        let mut stream = tokio_serial::new(port, config.baud_rate)
            .data_bits(config.data_bits.into())
            .stop_bits(config.stop_bits.into())
            .parity(config.parity.into())
            .flow_control(config.flow_control.into())
            .open_native_async()
            .map_err(|e| {
                tracing::error!(port = %port, error = %e, "Failed to open serial port");
                Error::Transport(format!("cannot open {port}: {e}"))
            })?;

        // The scanner's CDC interface only answers once the host raises DTR.
        if let Err(e) = stream.write_data_terminal_ready(true) {
            tracing::warn!(port = %port, error = %e, "Failed to assert DTR");
        }

        // Drop anything queued before we attached.
        if let Err(e) = stream.clear(tokio_serial::ClearBuffer::All) {
            tracing::warn!(port = %port, error = %e, "Failed to clear serial buffers");
        }

        tracing::info!(port = %port, baud_rate = config.baud_rate, "Serial port opened");

        Ok(Self {
            port: Some(stream),
            port_name: port.to_string(),
        })
    }

    /// Get the name of the serial port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        tracing::trace!(
            port = %self.port_name,
            line = %String::from_utf8_lossy(data).trim_end(),
            "send"
        );

        port.write_all(data).await.map_err(|e| {
            tracing::error!(port = %self.port_name, error = %e, "Failed to send data");
            map_io_error(e)
        })?;
        port.flush().await.map_err(map_io_error)
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let port = self.port.as_mut().ok_or(Error::NotConnected)?;

        match tokio::time::timeout(timeout, port.read(buf)).await {
            Ok(Ok(n)) => {
                tracing::trace!(
                    port = %self.port_name,
                    bytes = n,
                    data = %String::from_utf8_lossy(&buf[..n]).trim_end(),
                    "receive"
                );
                Ok(n)
            }
            Ok(Err(e)) => {
                tracing::error!(port = %self.port_name, error = %e, "Failed to receive data");
                Err(map_io_error(e))
            }
            Err(_) => {
                tracing::trace!(
                    port = %self.port_name,
                    timeout_ms = timeout.as_millis(),
                    "receive timed out"
                );
                Err(Error::Timeout)
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut port) = self.port.take() {
            if let Err(e) = port.flush().await {
                tracing::warn!(port = %self.port_name, error = %e, "Flush before close failed");
            }
            tracing::info!(port = %self.port_name, "Serial port closed");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.port.is_some() {
            tracing::debug!(port = %self.port_name, "SerialTransport dropped while open");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_uniden_8n1() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.flow_control, FlowControl::None);
    }

    #[test]
    fn with_baud_rate_keeps_line_settings() {
        let config = SerialConfig::with_baud_rate(57_600);
        assert_eq!(config.baud_rate, 57_600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.flow_control, FlowControl::None);
    }

    #[test]
    fn line_setting_conversions() {
        assert_eq!(
            tokio_serial::DataBits::from(DataBits::Eight),
            tokio_serial::DataBits::Eight
        );
        assert_eq!(
            tokio_serial::StopBits::from(StopBits::Two),
            tokio_serial::StopBits::Two
        );
        assert_eq!(
            tokio_serial::Parity::from(Parity::Even),
            tokio_serial::Parity::Even
        );
        assert_eq!(
            tokio_serial::FlowControl::from(FlowControl::Hardware),
            tokio_serial::FlowControl::Hardware
        );
    }

    #[test]
    fn broken_pipe_maps_to_connection_lost() {
        let e = map_io_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"));
        assert!(matches!(e, Error::ConnectionLost));

        let e = map_io_error(std::io::Error::new(std::io::ErrorKind::Other, "odd"));
        assert!(matches!(e, Error::Io(_)));
    }

    #[tokio::test]
    async fn open_missing_port_fails_with_transport_error() {
        let result = SerialTransport::open("/dev/scanlib-does-not-exist", 115_200).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
