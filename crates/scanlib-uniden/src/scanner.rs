//! UnidenScanner -- a live session with a handheld scanner.
//!
//! This module ties the data objects ([`sdo`](crate::sdo)) and line protocol
//! ([`protocol`]) to a [`Transport`]. It handles command framing, reply
//! collection, retry on timeout, and the program-mode bracket the scanner
//! requires around every settings read or write.
//!
//! Uniden replies are strictly request/response: the scanner never sends
//! unsolicited lines, so one command is in flight at a time and the
//! transport lock is held for the whole exchange.

use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use scanlib_core::error::{DecodeError, Error, Result};
use scanlib_core::transport::Transport;

use crate::identity::{DeviceModel, EnterProgramMode, ExitProgramMode, FirmwareVersion};
use crate::protocol::{self, DecodeResult, ScannerCommand};
use crate::savefile::ScannerSettings;
use crate::sdo::Sdo;

/// What a scanner reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerInfo {
    pub model: String,
    pub firmware: String,
}

/// A connected Uniden scanner.
///
/// Constructed via [`ScannerBuilder`](crate::builder::ScannerBuilder). All
/// communication goes through the [`Transport`] provided at build time.
pub struct UnidenScanner {
    transport: Mutex<Box<dyn Transport>>,
    auto_retry: bool,
    max_retries: u32,
    command_timeout: Duration,
}

impl UnidenScanner {
    /// Called by [`ScannerBuilder`](crate::builder::ScannerBuilder).
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        auto_retry: bool,
        max_retries: u32,
        command_timeout: Duration,
    ) -> Self {
        UnidenScanner {
            transport: Mutex::new(transport),
            auto_retry,
            max_retries,
            command_timeout,
        }
    }

    /// Send one command and wait for its reply line.
    ///
    /// Reads from the transport until a `\r` terminator arrives, then decodes
    /// the line. An `ERR` reply fails with [`Error::Protocol`]; a scanner
    /// that stays silent is retried up to `max_retries` times (when
    /// auto-retry is on) before failing with [`Error::Timeout`]. `NG` replies
    /// are returned as-is for the caller to judge.
    pub async fn execute(&self, cmd: &ScannerCommand) -> Result<ScannerCommand> {
        let retries = if self.auto_retry { self.max_retries } else { 0 };
        let bytes = cmd.encode();
        let mut transport = self.transport.lock().await;

        if !transport.is_connected() {
            return Err(Error::NotConnected);
        }

        for attempt in 0..=retries {
            if attempt > 0 {
                warn!(command = %cmd, attempt, "no reply from scanner, retrying");
                tokio::time::sleep(Duration::from_millis(20 * attempt as u64)).await;
            }

            debug!(command = %cmd, "sending");
            transport.send(&bytes).await?;

            let mut buf = [0u8; 256];
            let mut response_buf = Vec::new();

            loop {
                match tokio::time::timeout(
                    self.command_timeout,
                    transport.receive(&mut buf, self.command_timeout),
                )
                .await
                {
                    Ok(Ok(0)) => return Err(Error::ConnectionLost),
                    Ok(Ok(n)) => {
                        response_buf.extend_from_slice(&buf[..n]);
                        match protocol::decode_response(&response_buf) {
                            DecodeResult::Reply { reply, .. } => {
                                debug!(reply = %reply, "received");
                                return Ok(reply);
                            }
                            DecodeResult::Error(_) => {
                                return Err(Error::Protocol(format!(
                                    "scanner answered ERR to {cmd}"
                                )));
                            }
                            DecodeResult::Incomplete => {}
                        }
                    }
                    // Either the transport's own deadline or ours; same outcome.
                    Ok(Err(Error::Timeout)) | Err(_) => break,
                    Ok(Err(e)) => return Err(e),
                }
            }
        }

        Err(Error::Timeout)
    }

    /// Read one data object from the scanner.
    ///
    /// Settings can only be read in program mode; a `CODE,NG` reply fails
    /// with [`Error::Protocol`] and leaves `sdo` untouched.
    pub async fn fetch(&self, sdo: &mut dyn Sdo) -> Result<()> {
        debug!(code = %sdo.code(), "fetch");
        let reply = self.execute(&sdo.fetch_command()).await?;
        if reply.is_rejected() {
            return Err(Error::Protocol(format!(
                "scanner refused {} (not in program mode?)",
                sdo.code()
            )));
        }
        sdo.import_reply(&reply)
    }

    /// Push one data object's value to the scanner and require `CODE,OK`.
    pub async fn write(&self, sdo: &dyn Sdo) -> Result<()> {
        let cmd = sdo.write_command()?;
        debug!(code = %sdo.code(), command = %cmd, "write");
        let reply = self.execute(&cmd).await?;

        if reply.code() != sdo.code() {
            return Err(DecodeError::CodeMismatch {
                expected: sdo.code(),
                actual: reply.code().to_string(),
            }
            .into());
        }
        if reply.is_ack() {
            Ok(())
        } else if reply.is_rejected() {
            Err(Error::Protocol(format!(
                "scanner rejected {cmd} (not in program mode?)"
            )))
        } else {
            Err(Error::Protocol(format!(
                "unexpected reply {reply} to {cmd}"
            )))
        }
    }

    /// Send `PRG`. The scanner stops scanning and shows "Remote Mode".
    pub async fn enter_program_mode(&self) -> Result<()> {
        self.fetch(&mut EnterProgramMode).await
    }

    /// Send `EPG` and resume scanning.
    pub async fn exit_program_mode(&self) -> Result<()> {
        self.fetch(&mut ExitProgramMode).await
    }

    /// The model name (`MDL`). Works outside program mode.
    pub async fn model(&self) -> Result<String> {
        let mut mdl = DeviceModel::default();
        self.fetch(&mut mdl).await?;
        Ok(mdl.model().unwrap_or_default().to_string())
    }

    /// The firmware version string (`VER`). Works outside program mode.
    pub async fn firmware_version(&self) -> Result<String> {
        let mut ver = FirmwareVersion::default();
        self.fetch(&mut ver).await?;
        Ok(ver.version().unwrap_or_default().to_string())
    }

    /// Check that a scanner is answering by reading its model and firmware.
    pub async fn test_connection(&self) -> Result<ScannerInfo> {
        let model = self.model().await?;
        let firmware = self.firmware_version().await?;
        debug!(%model, %firmware, "scanner identified");
        Ok(ScannerInfo { model, firmware })
    }

    /// Read every setting inside a `PRG`/`EPG` bracket.
    pub async fn read_settings(&self) -> Result<ScannerSettings> {
        self.enter_program_mode().await?;

        let mut settings = ScannerSettings::default();
        let mut result = Ok(());
        for sdo in settings.sdos_mut() {
            result = self.fetch(sdo).await;
            if result.is_err() {
                break;
            }
        }

        self.leave_program_mode_after(result).await?;
        Ok(settings)
    }

    /// Write every setting inside a `PRG`/`EPG` bracket.
    ///
    /// Stops at the first failed write; settings already written stay
    /// written.
    pub async fn write_settings(&self, settings: &ScannerSettings) -> Result<()> {
        self.enter_program_mode().await?;

        let mut result = Ok(());
        for sdo in settings.sdos() {
            result = self.write(sdo).await;
            if result.is_err() {
                break;
            }
        }

        self.leave_program_mode_after(result).await
    }

    /// Send `EPG` whatever `body` returned. The body's error wins over a
    /// failed exit.
    async fn leave_program_mode_after(&self, body: Result<()>) -> Result<()> {
        let exit = self.exit_program_mode().await;
        match (body, exit) {
            (Err(e), Err(exit_err)) => {
                warn!(error = %exit_err, "failed to leave program mode");
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), exit) => exit,
        }
    }

    /// Close the underlying transport.
    pub async fn close(&self) -> Result<()> {
        debug!("closing scanner session");
        self.transport.lock().await.close().await
    }

    pub async fn is_connected(&self) -> bool {
        self.transport.lock().await.is_connected()
    }
}
