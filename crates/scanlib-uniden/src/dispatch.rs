//! Command dispatch table: which data object owns a command code.
//!
//! Used to decode replies whose origin is not known in advance (shell
//! sessions, captured logs, batch replies). The table is static; every
//! entry also states its [`Category`] so callers can check what is legal
//! before building an object.

use std::fmt;
use std::str::FromStr;

use scanlib_core::{Error, Result};

use crate::identity::{DeviceModel, EnterProgramMode, ExitProgramMode, FirmwareVersion};
use crate::protocol::ScannerCommand;
use crate::sdo::{Category, Sdo};
use crate::settings::{Backlight, BatteryChargeTimer, KeyBeepLock};

/// Every data object type the library knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdoKind {
    EnterProgramMode,
    ExitProgramMode,
    DeviceModel,
    FirmwareVersion,
    Backlight,
    BatteryChargeTimer,
    KeyBeepLock,
}

impl SdoKind {
    /// All kinds, identity first.
    pub const ALL: &'static [SdoKind] = &[
        SdoKind::EnterProgramMode,
        SdoKind::ExitProgramMode,
        SdoKind::DeviceModel,
        SdoKind::FirmwareVersion,
        SdoKind::Backlight,
        SdoKind::BatteryChargeTimer,
        SdoKind::KeyBeepLock,
    ];

    pub fn code(self) -> &'static str {
        match self {
            SdoKind::EnterProgramMode => EnterProgramMode::CODE,
            SdoKind::ExitProgramMode => ExitProgramMode::CODE,
            SdoKind::DeviceModel => DeviceModel::CODE,
            SdoKind::FirmwareVersion => FirmwareVersion::CODE,
            SdoKind::Backlight => Backlight::CODE,
            SdoKind::BatteryChargeTimer => BatteryChargeTimer::CODE,
            SdoKind::KeyBeepLock => KeyBeepLock::CODE,
        }
    }

    pub fn category(self) -> Category {
        match self {
            SdoKind::EnterProgramMode | SdoKind::ExitProgramMode => Category::CommandOnly,
            SdoKind::DeviceModel | SdoKind::FirmwareVersion => Category::ReadOnly,
            SdoKind::Backlight | SdoKind::BatteryChargeTimer | SdoKind::KeyBeepLock => {
                Category::ReadWrite
            }
        }
    }

    /// Resolve a command code. Unknown codes fail with
    /// [`Error::UnrecognizedCommand`].
    pub fn from_code(code: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.code() == code)
            .ok_or_else(|| Error::UnrecognizedCommand(code.to_string()))
    }

    /// A fresh object of this kind holding its default value.
    pub fn instantiate(self) -> Box<dyn Sdo> {
        match self {
            SdoKind::EnterProgramMode => Box::new(EnterProgramMode),
            SdoKind::ExitProgramMode => Box::new(ExitProgramMode),
            SdoKind::DeviceModel => Box::new(DeviceModel::default()),
            SdoKind::FirmwareVersion => Box::new(FirmwareVersion::default()),
            SdoKind::Backlight => Box::new(Backlight::default()),
            SdoKind::BatteryChargeTimer => Box::new(BatteryChargeTimer::default()),
            SdoKind::KeyBeepLock => Box::new(KeyBeepLock::default()),
        }
    }
}

impl fmt::Display for SdoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SdoKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s)
    }
}

/// Resolve a code to its kind.
pub fn lookup(code: &str) -> Result<SdoKind> {
    SdoKind::from_code(code)
}

/// Build the object that owns `reply` and import the reply into it.
pub fn decode_reply(reply: &ScannerCommand) -> Result<Box<dyn Sdo>> {
    let mut sdo = lookup(reply.code())?.instantiate();
    sdo.import_reply(reply)?;
    Ok(sdo)
}
