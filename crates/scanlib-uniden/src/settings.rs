//! Read/write setting data objects: backlight, battery charge timer, and
//! key beep / key lock.
//!
//! Each setting round-trips through both the wire form (`BLT,SQ`) and its
//! save-file form (`Squelch`). All setters validate before assigning.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use scanlib_core::{DecodeError, Error, Result};

use crate::codec::{IntRange, WireEnum, decode_pair, expect_fields};
use crate::protocol::ScannerCommand;
use crate::sdo::{Category, Sdo};

// ---------------------------------------------------------------
// BLT backlight
// ---------------------------------------------------------------

/// When the display backlight turns on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BacklightMode {
    AlwaysOn,
    #[default]
    AlwaysOff,
    Keypress,
    Squelch,
    KeypressOrSquelch,
}

impl WireEnum for BacklightMode {
    const FIELD: &'static str = "backlight";
    const VARIANTS: &'static [Self] = &[
        BacklightMode::AlwaysOn,
        BacklightMode::AlwaysOff,
        BacklightMode::Keypress,
        BacklightMode::Squelch,
        BacklightMode::KeypressOrSquelch,
    ];

    fn code(self) -> &'static str {
        match self {
            BacklightMode::AlwaysOn => "AO",
            BacklightMode::AlwaysOff => "AF",
            BacklightMode::Keypress => "KY",
            BacklightMode::Squelch => "SQ",
            BacklightMode::KeypressOrSquelch => "KS",
        }
    }

    fn name(self) -> &'static str {
        match self {
            BacklightMode::AlwaysOn => "AlwaysOn",
            BacklightMode::AlwaysOff => "AlwaysOff",
            BacklightMode::Keypress => "Keypress",
            BacklightMode::Squelch => "Squelch",
            BacklightMode::KeypressOrSquelch => "KeypressOrSquelch",
        }
    }

    fn label(self) -> &'static str {
        match self {
            BacklightMode::AlwaysOn => "Always On",
            BacklightMode::AlwaysOff => "Always Off",
            BacklightMode::Keypress => "Keypress",
            BacklightMode::Squelch => "Squelch",
            BacklightMode::KeypressOrSquelch => "Keypress + Squelch",
        }
    }
}

impl fmt::Display for BacklightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BacklightMode {
    type Err = DecodeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// `BLT` -- backlight mode. Defaults to [`BacklightMode::AlwaysOff`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Backlight {
    mode: BacklightMode,
}

impl Backlight {
    pub const CODE: &'static str = "BLT";
    pub const KEY: &'static str = "backlight";

    pub fn new(mode: BacklightMode) -> Self {
        Backlight { mode }
    }

    pub fn get(&self) -> BacklightMode {
        self.mode
    }

    pub fn set(&mut self, mode: BacklightMode) {
        self.mode = mode;
    }

    /// Set from a wire code (`"SQ"`) or a variant name (`"Squelch"`).
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        self.mode = BacklightMode::decode(text)?;
        Ok(())
    }
}

impl Sdo for Backlight {
    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::ReadWrite
    }

    fn write_command(&self) -> Result<ScannerCommand> {
        Ok(ScannerCommand::new(Self::CODE).arg(self.mode.code()))
    }

    fn import_response(&mut self, fields: &[&str]) -> Result<()> {
        let [mode] = expect_fields::<1>(Self::CODE, fields)?;
        self.mode = BacklightMode::from_code(mode)?;
        Ok(())
    }

    fn persisted_key(&self) -> Option<&'static str> {
        Some(Self::KEY)
    }

    fn export_text(&self) -> Result<String> {
        Ok(self.mode.name().to_string())
    }

    fn import_text(&mut self, text: &str) -> Result<()> {
        self.set_text(text.trim())
    }
}

// ---------------------------------------------------------------
// BSV battery charge timer
// ---------------------------------------------------------------

/// Recommended charge hours for Ni-MH cells, by capacity in mAh.
const CHARGE_RECOMMENDATIONS: &[(u32, u8)] = &[
    (1500, 9),
    (1800, 11),
    (2000, 12),
    (2100, 13),
    (2200, 13),
    (2300, 14),
    (2500, 15),
    (2700, 16),
];

/// `BSV` -- how many hours the scanner charges its batteries over USB.
///
/// Valid range is 1-16 hours; the default is 9, the figure for the
/// 1500 mAh cells shipped with the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryChargeTimer {
    hours: u8,
}

impl BatteryChargeTimer {
    pub const CODE: &'static str = "BSV";
    pub const KEY: &'static str = "hours";
    pub const HOURS: IntRange = IntRange::new("hours", 1, 16);
    pub const DEFAULT_HOURS: u8 = 9;

    pub fn new(hours: u8) -> Result<Self> {
        let mut timer = Self::default();
        timer.set(hours)?;
        Ok(timer)
    }

    pub fn get(&self) -> u8 {
        self.hours
    }

    /// Fails with [`DecodeError::Range`] outside 1-16; never clamps.
    pub fn set(&mut self, hours: u8) -> Result<()> {
        Self::HOURS.check(i64::from(hours))?;
        self.hours = hours;
        Ok(())
    }

    pub fn set_text(&mut self, text: &str) -> Result<()> {
        let hours = Self::HOURS.decode(text)?;
        // In range, so it fits.
        self.hours = hours as u8;
        Ok(())
    }

    /// Charge time for Ni-MH cells of the given capacity, rounding the
    /// capacity down to the nearest tabulated size. `None` below 1500 mAh.
    pub fn recommended_for_mah(capacity_mah: u32) -> Option<u8> {
        CHARGE_RECOMMENDATIONS
            .iter()
            .rev()
            .find(|(mah, _)| capacity_mah >= *mah)
            .map(|(_, hours)| *hours)
    }
}

impl Default for BatteryChargeTimer {
    fn default() -> Self {
        BatteryChargeTimer {
            hours: Self::DEFAULT_HOURS,
        }
    }
}

impl Sdo for BatteryChargeTimer {
    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::ReadWrite
    }

    fn write_command(&self) -> Result<ScannerCommand> {
        Ok(ScannerCommand::new(Self::CODE).arg(Self::HOURS.encode(i64::from(self.hours))))
    }

    fn import_response(&mut self, fields: &[&str]) -> Result<()> {
        let [hours] = expect_fields::<1>(Self::CODE, fields)?;
        self.set_text(hours)
    }

    fn persisted_key(&self) -> Option<&'static str> {
        Some(Self::KEY)
    }

    fn export_text(&self) -> Result<String> {
        Ok(Self::HOURS.encode(i64::from(self.hours)))
    }

    fn import_text(&mut self, text: &str) -> Result<()> {
        self.set_text(text)
    }
}

// ---------------------------------------------------------------
// KBP key beep / key lock
// ---------------------------------------------------------------

/// Key beep volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BeepLevel {
    /// Beep follows the master volume.
    #[default]
    Auto,
    Off,
}

impl WireEnum for BeepLevel {
    const FIELD: &'static str = "level";
    const VARIANTS: &'static [Self] = &[BeepLevel::Auto, BeepLevel::Off];

    fn code(self) -> &'static str {
        match self {
            BeepLevel::Auto => "0",
            BeepLevel::Off => "99",
        }
    }

    fn name(self) -> &'static str {
        match self {
            BeepLevel::Auto => "Auto",
            BeepLevel::Off => "Off",
        }
    }

    fn label(self) -> &'static str {
        self.name()
    }
}

impl BeepLevel {
    /// The wire code as a number, as written in the save-file record.
    pub fn value(self) -> u8 {
        match self {
            BeepLevel::Auto => 0,
            BeepLevel::Off => 99,
        }
    }
}

/// Keypad lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyLock {
    #[default]
    Unlocked,
    Locked,
}

impl WireEnum for KeyLock {
    const FIELD: &'static str = "lock";
    const VARIANTS: &'static [Self] = &[KeyLock::Unlocked, KeyLock::Locked];

    fn code(self) -> &'static str {
        match self {
            KeyLock::Unlocked => "0",
            KeyLock::Locked => "1",
        }
    }

    fn name(self) -> &'static str {
        match self {
            KeyLock::Unlocked => "Unlocked",
            KeyLock::Locked => "Locked",
        }
    }

    fn label(self) -> &'static str {
        self.name()
    }
}

impl KeyLock {
    /// The wire code as a number, as written in the save-file record.
    pub fn value(self) -> u8 {
        match self {
            KeyLock::Unlocked => 0,
            KeyLock::Locked => 1,
        }
    }
}

/// A save-file field that may be written as a number or as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RecordField {
    Number(u64),
    Text(String),
}

impl RecordField {
    fn decode<E: WireEnum>(&self) -> std::result::Result<E, DecodeError> {
        match self {
            RecordField::Number(n) => E::from_code(&n.to_string()),
            RecordField::Text(s) => E::decode(s),
        }
    }
}

/// Save-file record of [`KeyBeepLock`]: `{"level":0,"lock":0}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct KeyBeepRecord {
    level: RecordField,
    lock: RecordField,
}

/// `KBP` -- key beep level and keypad lock, carried together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyBeepLock {
    level: BeepLevel,
    lock: KeyLock,
}

impl KeyBeepLock {
    pub const CODE: &'static str = "KBP";
    pub const KEY: &'static str = "key_beep_lock";

    pub fn new(level: BeepLevel, lock: KeyLock) -> Self {
        KeyBeepLock { level, lock }
    }

    pub fn get(&self) -> (BeepLevel, KeyLock) {
        (self.level, self.lock)
    }

    pub fn level(&self) -> BeepLevel {
        self.level
    }

    pub fn lock(&self) -> KeyLock {
        self.lock
    }

    pub fn set(&mut self, level: BeepLevel, lock: KeyLock) {
        self.level = level;
        self.lock = lock;
    }

    /// Set both fields from codes or names; neither changes unless both
    /// decode.
    pub fn set_text(&mut self, level: &str, lock: &str) -> Result<()> {
        let (level, lock) = decode_pair::<BeepLevel, KeyLock>(level, lock)?;
        self.set(level, lock);
        Ok(())
    }
}

impl Sdo for KeyBeepLock {
    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::ReadWrite
    }

    fn write_command(&self) -> Result<ScannerCommand> {
        Ok(ScannerCommand::new(Self::CODE)
            .arg(self.level.code())
            .arg(self.lock.code()))
    }

    fn import_response(&mut self, fields: &[&str]) -> Result<()> {
        let [level, lock] = expect_fields::<2>(Self::CODE, fields)?;
        let level = BeepLevel::from_code(level)?;
        let lock = KeyLock::from_code(lock)?;
        self.set(level, lock);
        Ok(())
    }

    fn persisted_key(&self) -> Option<&'static str> {
        Some(Self::KEY)
    }

    fn export_text(&self) -> Result<String> {
        let record = KeyBeepRecord {
            level: RecordField::Number(u64::from(self.level.value())),
            lock: RecordField::Number(u64::from(self.lock.value())),
        };
        serde_json::to_string(&record).map_err(|e| Error::Io(e.into()))
    }

    fn import_text(&mut self, text: &str) -> Result<()> {
        let record: KeyBeepRecord =
            serde_json::from_str(text).map_err(|_| DecodeError::Format {
                field: Self::KEY,
                value: text.to_string(),
                expected: "{\"level\": .., \"lock\": ..} record",
            })?;
        let level = record.level.decode::<BeepLevel>()?;
        let lock = record.lock.decode::<KeyLock>()?;
        self.set(level, lock);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(cmd: &ScannerCommand) -> ScannerCommand {
        ScannerCommand::parse(&cmd.to_string()).unwrap()
    }

    // ---------------------------------------------------------------
    // Backlight
    // ---------------------------------------------------------------

    #[test]
    fn backlight_defaults_to_always_off() {
        assert_eq!(Backlight::default().get(), BacklightMode::AlwaysOff);
    }

    #[test]
    fn backlight_wire_round_trip() {
        let mut blt = Backlight::default();
        blt.set(BacklightMode::Squelch);
        let cmd = blt.write_command().unwrap();
        assert_eq!(cmd.fields(), vec!["BLT", "SQ"]);

        let mut back = Backlight::default();
        back.import_reply(&split(&cmd)).unwrap();
        assert_eq!(back.get(), BacklightMode::Squelch);
    }

    #[test]
    fn backlight_every_mode_round_trips() {
        for &mode in BacklightMode::VARIANTS {
            let blt = Backlight::new(mode);

            let mut wire = Backlight::default();
            wire.import_reply(&split(&blt.write_command().unwrap()))
                .unwrap();
            assert_eq!(wire, blt);

            let mut text = Backlight::default();
            text.import_text(&blt.export_text().unwrap()).unwrap();
            assert_eq!(text, blt);
        }
    }

    #[test]
    fn backlight_unknown_code_leaves_value() {
        let mut blt = Backlight::new(BacklightMode::Keypress);
        let err = blt.set_text("ZZ").unwrap_err();
        assert!(matches!(
            err,
            Error::Decode(DecodeError::UnknownCode {
                field: "backlight",
                ..
            })
        ));
        assert_eq!(blt.get(), BacklightMode::Keypress);

        assert!(blt.import_response(&["ZZ"]).is_err());
        assert_eq!(blt.get(), BacklightMode::Keypress);
    }

    #[test]
    fn backlight_text_accepts_code_then_name() {
        let mut blt = Backlight::default();
        blt.import_text("KS").unwrap();
        assert_eq!(blt.get(), BacklightMode::KeypressOrSquelch);
        blt.import_text("AlwaysOn").unwrap();
        assert_eq!(blt.get(), BacklightMode::AlwaysOn);
        assert_eq!(blt.export_text().unwrap(), "AlwaysOn");
    }

    #[test]
    fn backlight_wire_import_wants_codes() {
        let mut blt = Backlight::default();
        assert!(blt.import_response(&["Squelch"]).is_err());
        assert!(blt.import_response(&["SQ", "AO"]).is_err());
        assert_eq!(blt.get(), BacklightMode::AlwaysOff);
    }

    #[test]
    fn backlight_display_and_parse() {
        assert_eq!(BacklightMode::KeypressOrSquelch.to_string(), "Keypress + Squelch");
        assert_eq!("SQ".parse::<BacklightMode>(), Ok(BacklightMode::Squelch));
    }

    // ---------------------------------------------------------------
    // Battery charge timer
    // ---------------------------------------------------------------

    #[test]
    fn battery_default_is_nine_hours() {
        assert_eq!(BatteryChargeTimer::default().get(), 9);
    }

    #[test]
    fn battery_range_is_inclusive() {
        let mut bsv = BatteryChargeTimer::default();
        assert!(bsv.set(1).is_ok());
        assert!(bsv.set(16).is_ok());
        assert_eq!(bsv.get(), 16);

        for bad in [0, 17] {
            assert!(matches!(
                bsv.set(bad),
                Err(Error::Decode(DecodeError::Range { .. }))
            ));
            assert_eq!(bsv.get(), 16);
        }
    }

    #[test]
    fn battery_text_round_trip() {
        let bsv = BatteryChargeTimer::new(16).unwrap();
        assert_eq!(bsv.export_text().unwrap(), "16");

        for hours in 1..=16 {
            let bsv = BatteryChargeTimer::new(hours).unwrap();
            let mut back = BatteryChargeTimer::new(if hours == 1 { 16 } else { 1 }).unwrap();
            back.import_text(&bsv.export_text().unwrap()).unwrap();
            assert_eq!(back.get(), hours);
        }
    }

    #[test]
    fn battery_wire_round_trip() {
        let cmd = BatteryChargeTimer::new(14).unwrap().write_command().unwrap();
        assert_eq!(cmd.to_string(), "BSV,14");

        for hours in 1..=16 {
            let bsv = BatteryChargeTimer::new(hours).unwrap();
            let mut back = BatteryChargeTimer::new(if hours == 1 { 16 } else { 1 }).unwrap();
            back.import_reply(&split(&bsv.write_command().unwrap()))
                .unwrap();
            assert_eq!(back, bsv);
        }
    }

    #[test]
    fn battery_import_rejects_out_of_range_and_garbage() {
        let mut bsv = BatteryChargeTimer::new(12).unwrap();
        assert!(matches!(
            bsv.import_response(&["17"]),
            Err(Error::Decode(DecodeError::Range { value: 17, .. }))
        ));
        assert!(matches!(
            bsv.import_text("twelve"),
            Err(Error::Decode(DecodeError::Format { .. }))
        ));
        assert!(matches!(
            bsv.import_text("300"),
            Err(Error::Decode(DecodeError::Range { .. }))
        ));
        assert_eq!(bsv.get(), 12);
    }

    #[test]
    fn battery_new_rejects_zero() {
        assert!(BatteryChargeTimer::new(0).is_err());
    }

    #[test]
    fn battery_recommendations() {
        assert_eq!(BatteryChargeTimer::recommended_for_mah(1000), None);
        assert_eq!(BatteryChargeTimer::recommended_for_mah(1500), Some(9));
        assert_eq!(BatteryChargeTimer::recommended_for_mah(2250), Some(13));
        assert_eq!(BatteryChargeTimer::recommended_for_mah(2300), Some(14));
        assert_eq!(BatteryChargeTimer::recommended_for_mah(3000), Some(16));
    }

    // ---------------------------------------------------------------
    // Key beep / lock
    // ---------------------------------------------------------------

    #[test]
    fn key_beep_defaults() {
        assert_eq!(
            KeyBeepLock::default().get(),
            (BeepLevel::Auto, KeyLock::Unlocked)
        );
    }

    #[test]
    fn key_beep_wire_round_trip() {
        let kbp = KeyBeepLock::new(BeepLevel::Off, KeyLock::Locked);
        let cmd = kbp.write_command().unwrap();
        assert_eq!(cmd.fields(), vec!["KBP", "99", "1"]);

        let mut back = KeyBeepLock::default();
        back.import_reply(&split(&cmd)).unwrap();
        assert_eq!(back, kbp);
    }

    #[test]
    fn key_beep_every_combination_round_trips() {
        for &level in BeepLevel::VARIANTS {
            for &lock in KeyLock::VARIANTS {
                let kbp = KeyBeepLock::new(level, lock);

                let mut wire = KeyBeepLock::default();
                wire.import_reply(&split(&kbp.write_command().unwrap()))
                    .unwrap();
                assert_eq!(wire, kbp);

                let mut text = KeyBeepLock::default();
                text.import_text(&kbp.export_text().unwrap()).unwrap();
                assert_eq!(text, kbp);
            }
        }
    }

    #[test]
    fn key_beep_values_match_wire_codes() {
        for &level in BeepLevel::VARIANTS {
            assert_eq!(level.value().to_string(), level.code());
        }
        for &lock in KeyLock::VARIANTS {
            assert_eq!(lock.value().to_string(), lock.code());
        }
    }

    #[test]
    fn key_beep_bad_lock_changes_nothing() {
        let mut kbp = KeyBeepLock::new(BeepLevel::Off, KeyLock::Unlocked);
        let err = kbp.import_response(&["0", "9"]).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode(DecodeError::UnknownCode { field: "lock", .. })
        ));
        assert_eq!(kbp.level(), BeepLevel::Off);
        assert_eq!(kbp.lock(), KeyLock::Unlocked);
    }

    #[test]
    fn key_beep_set_text_is_atomic() {
        let mut kbp = KeyBeepLock::default();
        assert!(kbp.set_text("Off", "maybe").is_err());
        assert_eq!(kbp.get(), (BeepLevel::Auto, KeyLock::Unlocked));

        kbp.set_text("99", "Locked").unwrap();
        assert_eq!(kbp.get(), (BeepLevel::Off, KeyLock::Locked));
    }

    #[test]
    fn key_beep_field_count() {
        let mut kbp = KeyBeepLock::default();
        assert!(matches!(
            kbp.import_response(&["0"]),
            Err(Error::Decode(DecodeError::FieldCount {
                expected: 2,
                actual: 1,
                ..
            }))
        ));
    }

    #[test]
    fn key_beep_text_is_nested_record() {
        let kbp = KeyBeepLock::new(BeepLevel::Off, KeyLock::Locked);
        let text = kbp.export_text().unwrap();
        assert_eq!(text, r#"{"level":99,"lock":1}"#);

        let mut back = KeyBeepLock::default();
        back.import_text(&text).unwrap();
        assert_eq!(back, kbp);
    }

    #[test]
    fn key_beep_text_accepts_names() {
        let mut kbp = KeyBeepLock::default();
        kbp.import_text(r#"{"level": "Off", "lock": 0}"#).unwrap();
        assert_eq!(kbp.get(), (BeepLevel::Off, KeyLock::Unlocked));
    }

    #[test]
    fn key_beep_text_rejects_bad_records() {
        let mut kbp = KeyBeepLock::new(BeepLevel::Off, KeyLock::Locked);
        assert!(matches!(
            kbp.import_text("level=0"),
            Err(Error::Decode(DecodeError::Format { .. }))
        ));
        assert!(matches!(
            kbp.import_text(r#"{"level": 50, "lock": 0}"#),
            Err(Error::Decode(DecodeError::UnknownCode { field: "level", .. }))
        ));
        assert_eq!(kbp.get(), (BeepLevel::Off, KeyLock::Locked));
    }

    #[test]
    fn key_beep_text_rejects_extra_fields() {
        let mut kbp = KeyBeepLock::default();
        assert!(matches!(
            kbp.import_text(r#"{"level":99,"lock":1,"volume":7}"#),
            Err(Error::Decode(DecodeError::Format { field: "key_beep_lock", .. }))
        ));
        assert_eq!(kbp.get(), (BeepLevel::Auto, KeyLock::Unlocked));
    }
}
