//! The scanner data object (SDO) contract.
//!
//! Every configurable property of the scanner is a type implementing [`Sdo`].
//! The trait offers the same four operations for every property; what a
//! property actually supports is declared up front by its [`Category`]:
//!
//! | Category      | fetch | write | import reply | save-file text |
//! |---------------|-------|-------|--------------|----------------|
//! | `CommandOnly` | yes   | no    | `OK` only    | no             |
//! | `ReadOnly`    | yes   | no    | yes          | no             |
//! | `ReadWrite`   | yes   | yes   | yes          | yes            |
//!
//! Calling an operation the category lacks fails with
//! [`Error::UnsupportedOperation`]. Imports validate every field before
//! touching state: on error the object is unchanged.

use std::fmt;

use scanlib_core::{DecodeError, Error, Result};

use crate::protocol::ScannerCommand;

/// What a data object can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// A bare command with no state (program mode enter/exit).
    CommandOnly,
    /// Identity data reported by the scanner; never written.
    ReadOnly,
    /// A setting that can be read, written, and saved to a file.
    ReadWrite,
}

impl Category {
    pub fn supports_write(self) -> bool {
        self == Category::ReadWrite
    }

    pub fn supports_persisted(self) -> bool {
        self == Category::ReadWrite
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::CommandOnly => "command-only",
            Category::ReadOnly => "read-only",
            Category::ReadWrite => "read-write",
        };
        f.write_str(s)
    }
}

/// A scanner data object.
///
/// Implementations override only the operations their [`Category`]
/// supports; the defaults reject the rest.
pub trait Sdo: fmt::Debug + Send + Sync {
    /// The three-letter command code. Fixed per type.
    fn code(&self) -> &'static str;

    fn category(&self) -> Category;

    /// Command asking the scanner for this property: the code alone.
    fn fetch_command(&self) -> ScannerCommand {
        ScannerCommand::new(self.code())
    }

    /// Command pushing the in-memory value to the scanner.
    fn write_command(&self) -> Result<ScannerCommand> {
        Err(Error::unsupported(self.code(), "write_command"))
    }

    /// Import a reply's argument fields (the echoed code already removed).
    fn import_response(&mut self, fields: &[&str]) -> Result<()>;

    /// Import a whole reply, verifying its code first.
    fn import_reply(&mut self, reply: &ScannerCommand) -> Result<()> {
        if reply.code() != self.code() {
            return Err(DecodeError::CodeMismatch {
                expected: self.code(),
                actual: reply.code().to_string(),
            }
            .into());
        }
        self.import_response(&reply.arg_strs())
    }

    /// Key of this object's record in a save file.
    fn persisted_key(&self) -> Option<&'static str> {
        None
    }

    /// The value in save-file form.
    fn export_text(&self) -> Result<String> {
        Err(Error::unsupported(self.code(), "export_text"))
    }

    /// Replace the value from save-file text.
    fn import_text(&mut self, _text: &str) -> Result<()> {
        Err(Error::unsupported(self.code(), "import_text"))
    }
}
