//! Program-mode commands and identity data objects.
//!
//! `PRG` and `EPG` carry no data: the scanner only acknowledges them. `MDL`
//! and `VER` report free-form strings that can be read but never written.

use scanlib_core::{DecodeError, Result};

use crate::codec::expect_fields;
use crate::protocol::ACK_OK;
use crate::sdo::{Category, Sdo};

/// Accept exactly the `OK` acknowledgement.
fn import_ack(code: &'static str, fields: &[&str]) -> Result<()> {
    let [status] = expect_fields::<1>(code, fields)?;
    if status == ACK_OK {
        Ok(())
    } else {
        Err(DecodeError::UnknownCode {
            field: "status",
            value: status.to_string(),
        }
        .into())
    }
}

/// Free-form text spanning every remaining field.
///
/// Commas split the reply on the wire; joining restores a value that
/// contained them. A blank value (`MDL,`) is rejected.
fn import_free_text(code: &'static str, fields: &[&str]) -> Result<String> {
    if fields.is_empty() {
        return Err(DecodeError::FieldCount {
            code,
            expected: 1,
            actual: 0,
        }
        .into());
    }
    let text = fields.join(",");
    if text.trim().is_empty() {
        return Err(DecodeError::Format {
            field: code,
            value: text,
            expected: "non-empty text",
        }
        .into());
    }
    Ok(text)
}

/// `PRG` -- put the scanner into program mode.
///
/// Settings can only be read or written while in program mode; the scanner
/// shows "Remote Mode" and stops scanning until [`ExitProgramMode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnterProgramMode;

impl EnterProgramMode {
    pub const CODE: &'static str = "PRG";
}

impl Sdo for EnterProgramMode {
    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::CommandOnly
    }

    fn import_response(&mut self, fields: &[&str]) -> Result<()> {
        import_ack(Self::CODE, fields)
    }
}

/// `EPG` -- leave program mode and resume scanning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExitProgramMode;

impl ExitProgramMode {
    pub const CODE: &'static str = "EPG";
}

impl Sdo for ExitProgramMode {
    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::CommandOnly
    }

    fn import_response(&mut self, fields: &[&str]) -> Result<()> {
        import_ack(Self::CODE, fields)
    }
}

/// `MDL` -- the scanner's model name (e.g. `BC125AT`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceModel {
    model: Option<String>,
}

impl DeviceModel {
    pub const CODE: &'static str = "MDL";

    /// `None` until a reply has been imported.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

impl Sdo for DeviceModel {
    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::ReadOnly
    }

    fn import_response(&mut self, fields: &[&str]) -> Result<()> {
        self.model = Some(import_free_text(Self::CODE, fields)?);
        Ok(())
    }
}

/// `VER` -- the firmware version string (e.g. `Version 1.06.06`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirmwareVersion {
    version: Option<String>,
}

impl FirmwareVersion {
    pub const CODE: &'static str = "VER";

    /// `None` until a reply has been imported.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl Sdo for FirmwareVersion {
    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::ReadOnly
    }

    fn import_response(&mut self, fields: &[&str]) -> Result<()> {
        self.version = Some(import_free_text(Self::CODE, fields)?);
        Ok(())
    }
}
