//! Uniden handheld scanner backend for scanlib.
//!
//! This crate implements the remote-command protocol spoken by Uniden
//! handheld scanners (BC125AT and relatives) over their USB serial port. It
//! provides:
//!
//! - **Protocol codec** ([`protocol`]) -- encode `\r`-terminated command
//!   lines and split replies into code and argument fields.
//! - **Value codecs** ([`codec`]) -- closed enumerations with a wire code and
//!   a display name, bounded integers, and field-count checks.
//! - **Data objects** ([`sdo`], [`identity`], [`settings`]) -- one type per
//!   scanner property, each declaring which of fetch/write/save it supports.
//! - **Dispatch** ([`dispatch`]) -- map a reply's code back to its owner.
//! - **Save files** ([`savefile`]) -- the writable settings as a text file.
//! - **Session** ([`scanner`]) -- run commands over a
//!   [`Transport`](scanlib_core::Transport) with retries and program-mode
//!   bracketing.
//! - **Builder** ([`builder`]) -- fluent construction of [`UnidenScanner`].
//!
//! # Example
//!
//! ```
//! use scanlib_uniden::protocol::ScannerCommand;
//! use scanlib_uniden::sdo::Sdo;
//! use scanlib_uniden::settings::{BacklightMode, Backlight};
//!
//! let mut blt = Backlight::default();
//! blt.import_reply(&ScannerCommand::parse("BLT,SQ\r").unwrap()).unwrap();
//! assert_eq!(blt.get(), BacklightMode::Squelch);
//!
//! blt.set(BacklightMode::AlwaysOn);
//! assert_eq!(blt.write_command().unwrap().encode(), b"BLT,AO\r");
//! ```

pub mod builder;
pub mod codec;
pub mod dispatch;
pub mod identity;
pub mod protocol;
pub mod savefile;
pub mod scanner;
pub mod sdo;
pub mod settings;

pub use builder::ScannerBuilder;
pub use dispatch::{SdoKind, decode_reply, lookup};
pub use protocol::ScannerCommand;
pub use savefile::ScannerSettings;
pub use scanner::{ScannerInfo, UnidenScanner};
pub use sdo::{Category, Sdo};
