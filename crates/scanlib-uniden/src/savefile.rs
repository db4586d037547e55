//! The scanner's writable settings as a group, and their save-file form.
//!
//! A save file holds one `key: text` line per setting:
//!
//! ```text
//! # model: BC125AT
//! # firmware: Version 1.06.06
//! backlight: AlwaysOff
//! hours: 9
//! key_beep_lock: {"level":0,"lock":0}
//! ```
//!
//! Blank lines and `#` comments are ignored. Each value is handed to the
//! owning data object's `import_text`, so the file accepts whatever the
//! objects accept (e.g. `backlight: SQ` as well as `backlight: Squelch`).

use std::collections::HashSet;

use scanlib_core::{DecodeError, Result};

use crate::sdo::Sdo;
use crate::settings::{Backlight, BatteryChargeTimer, KeyBeepLock};

/// Every read/write setting of a handheld.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScannerSettings {
    pub backlight: Backlight,
    pub battery: BatteryChargeTimer,
    pub key_beep: KeyBeepLock,
}

impl ScannerSettings {
    /// The settings as data objects, in file order.
    pub fn sdos(&self) -> [&dyn Sdo; 3] {
        [&self.backlight, &self.battery, &self.key_beep]
    }

    pub fn sdos_mut(&mut self) -> [&mut dyn Sdo; 3] {
        [&mut self.backlight, &mut self.battery, &mut self.key_beep]
    }

    /// Render the save file. `header` lines are written as `#` comments.
    pub fn to_save_text(&self, header: &[(&str, &str)]) -> Result<String> {
        let mut out = String::new();
        for (key, value) in header {
            out.push_str(&format!("# {key}: {value}\n"));
        }
        for sdo in self.sdos() {
            // Every member is read/write, so both are present.
            let key = sdo.persisted_key().unwrap_or(sdo.code());
            out.push_str(&format!("{key}: {}\n", sdo.export_text()?));
        }
        Ok(out)
    }

    /// Parse a save file on top of the defaults.
    ///
    /// Settings missing from the file keep their default. The first bad line
    /// aborts the whole parse.
    pub fn from_save_text(text: &str) -> Result<Self> {
        let mut settings = ScannerSettings::default();
        settings.apply_save_text(text)?;
        Ok(settings)
    }

    /// Apply a save file to these settings, all or nothing.
    ///
    /// Each key may appear once; a repeated key fails naming its line.
    pub fn apply_save_text(&mut self, text: &str) -> Result<()> {
        let mut staged = *self;
        let mut seen = HashSet::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                return Err(DecodeError::Format {
                    field: "save file",
                    value: format!("line {}: {raw}", index + 1),
                    expected: "`key: value`",
                }
                .into());
            };
            let key = key.trim();
            let value = value.trim();

            let target = staged
                .sdos_mut()
                .into_iter()
                .find(|sdo| sdo.persisted_key() == Some(key))
                .ok_or_else(|| DecodeError::UnknownCode {
                    field: "save file key",
                    value: key.to_string(),
                })?;
            if !seen.insert(key) {
                return Err(DecodeError::Format {
                    field: "save file",
                    value: format!("line {}: {raw}", index + 1),
                    expected: "each key at most once",
                }
                .into());
            }
            target.import_text(value)?;
        }

        *self = staged;
        Ok(())
    }
}
