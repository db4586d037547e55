//! Uniden remote-command text protocol encoder/decoder.
//!
//! Uniden handheld scanners accept carriage-return terminated ASCII commands
//! over their USB virtual COM port. A command is a three-letter code followed
//! by zero or more comma-separated argument fields.
//!
//! # Command format
//!
//! ```text
//! <CODE>[,<arg>]*\r
//! ```
//!
//! - `CODE`: three uppercase ASCII letters (e.g. `MDL`, `BLT`, `KBP`).
//! - `arg`: ASCII text without commas; no trailing delimiter.
//! - Terminator: `\r` (0x0D).
//!
//! # Reply format
//!
//! Replies echo the code as their first field: `BLT,AF\r` for a read,
//! `BLT,OK\r` or `BLT,NG\r` for a write. A scanner that does not understand
//! a command answers `ERR\r`.

use std::fmt;

use bytes::{BufMut, BytesMut};
use scanlib_core::{Error, Result};

/// Line terminator for commands and replies.
pub const TERMINATOR: u8 = b'\r';

/// Field separator inside a line.
pub const DELIMITER: char = ',';

/// The scanner's reply to an unknown or malformed command.
pub const ERROR_REPLY: &str = "ERR";

/// Acknowledgement field of an accepted write or mode command.
pub const ACK_OK: &str = "OK";

/// Reply field of a rejected write (e.g. outside program mode).
pub const ACK_NG: &str = "NG";

/// One command line: a code plus its argument fields.
///
/// Used for both directions: outgoing commands built by data objects and
/// incoming replies split from the scanner's output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScannerCommand {
    code: String,
    args: Vec<String>,
}

impl ScannerCommand {
    /// A command with no arguments (a fetch).
    pub fn new(code: impl Into<String>) -> Self {
        ScannerCommand {
            code: code.into(),
            args: Vec::new(),
        }
    }

    /// A command with argument fields.
    pub fn with_args<I, S>(code: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScannerCommand {
            code: code.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Append one argument field.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Split a received line into code and argument fields.
    ///
    /// A trailing `\r` or `\n` is ignored. An empty line is a protocol error.
    ///
    /// ```
    /// use scanlib_uniden::protocol::ScannerCommand;
    ///
    /// let reply = ScannerCommand::parse("KBP,0,1\r").unwrap();
    /// assert_eq!(reply.code(), "KBP");
    /// assert_eq!(reply.args(), ["0", "1"]);
    /// ```
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(Error::Protocol("empty line".into()));
        }
        let mut fields = line.split(DELIMITER);
        let code = fields.next().unwrap_or_default();
        Ok(ScannerCommand::with_args(code, fields))
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Arguments as string slices, the shape data objects import from.
    pub fn arg_strs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }

    /// All fields in wire order, code first.
    pub fn fields(&self) -> Vec<&str> {
        std::iter::once(self.code.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// `true` for the scanner's `ERR` reply.
    pub fn is_error(&self) -> bool {
        self.code == ERROR_REPLY && self.args.is_empty()
    }

    /// `true` for a `CODE,OK` acknowledgement.
    pub fn is_ack(&self) -> bool {
        self.args.len() == 1 && self.args[0] == ACK_OK
    }

    /// `true` for a `CODE,NG` rejection.
    pub fn is_rejected(&self) -> bool {
        self.args.len() == 1 && self.args[0] == ACK_NG
    }

    /// Encode as raw bytes ready for transmission, terminator included.
    ///
    /// ```
    /// use scanlib_uniden::protocol::ScannerCommand;
    ///
    /// assert_eq!(ScannerCommand::new("BLT").encode(), b"BLT\r");
    /// assert_eq!(ScannerCommand::new("KBP").arg("99").arg("1").encode(), b"KBP,99,1\r");
    /// ```
    pub fn encode(&self) -> Vec<u8> {
        let line = self.to_string();
        let mut buf = BytesMut::with_capacity(line.len() + 1);
        buf.put_slice(line.as_bytes());
        buf.put_u8(TERMINATOR);
        buf.to_vec()
    }
}

impl fmt::Display for ScannerCommand {
    /// The line without its terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)?;
        for arg in &self.args {
            write!(f, "{DELIMITER}{arg}")?;
        }
        Ok(())
    }
}

/// Result of attempting to decode one reply from a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    /// A complete reply line was decoded.
    Reply {
        reply: ScannerCommand,
        /// Number of bytes consumed from the input buffer, terminator included.
        consumed: usize,
    },

    /// The scanner answered `ERR`, or sent a line that is not UTF-8.
    /// The `usize` is the number of bytes consumed.
    Error(usize),

    /// No terminator yet. More data is needed.
    Incomplete,
}

/// Decode one `\r`-terminated reply from the front of `buf`.
///
/// Stray `\n` bytes (some firmware sends `\r\n`) and blank lines are skipped
/// and counted as consumed.
pub fn decode_response(buf: &[u8]) -> DecodeResult {
    let skip = buf
        .iter()
        .take_while(|&&b| b == b'\n' || b == TERMINATOR)
        .count();
    let rest = &buf[skip..];

    let Some(term_pos) = rest.iter().position(|&b| b == TERMINATOR) else {
        return DecodeResult::Incomplete;
    };
    let consumed = skip + term_pos + 1;

    let Ok(line) = std::str::from_utf8(&rest[..term_pos]) else {
        return DecodeResult::Error(consumed);
    };

    match ScannerCommand::parse(line) {
        Ok(reply) if reply.is_error() => DecodeResult::Error(consumed),
        Ok(reply) => DecodeResult::Reply { reply, consumed },
        Err(_) => DecodeResult::Error(consumed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // Command encoding
    // ---------------------------------------------------------------

    #[test]
    fn encode_fetch_has_no_delimiter() {
        assert_eq!(ScannerCommand::new("MDL").encode(), b"MDL\r");
    }

    #[test]
    fn encode_write_joins_with_commas() {
        let cmd = ScannerCommand::with_args("KBP", ["0", "1"]);
        assert_eq!(cmd.encode(), b"KBP,0,1\r");
        assert_eq!(cmd.to_string(), "KBP,0,1");
    }

    #[test]
    fn fields_start_with_code() {
        let cmd = ScannerCommand::new("BLT").arg("SQ");
        assert_eq!(cmd.fields(), vec!["BLT", "SQ"]);
    }

    // ---------------------------------------------------------------
    // Line parsing
    // ---------------------------------------------------------------

    #[test]
    fn parse_reply_with_args() {
        let reply = ScannerCommand::parse("BSV,14").unwrap();
        assert_eq!(reply.code(), "BSV");
        assert_eq!(reply.arg_strs(), vec!["14"]);
    }

    #[test]
    fn parse_strips_line_endings() {
        let reply = ScannerCommand::parse("EPG,OK\r\n").unwrap();
        assert_eq!(reply.code(), "EPG");
        assert!(reply.is_ack());
    }

    #[test]
    fn parse_keeps_empty_fields() {
        let reply = ScannerCommand::parse("VER,").unwrap();
        assert_eq!(reply.args(), [""]);
    }

    #[test]
    fn parse_empty_line_fails() {
        assert!(matches!(ScannerCommand::parse("\r"), Err(Error::Protocol(_))));
    }

    #[test]
    fn ack_and_rejection() {
        assert!(ScannerCommand::parse("BLT,OK").unwrap().is_ack());
        assert!(ScannerCommand::parse("BLT,NG").unwrap().is_rejected());
        assert!(!ScannerCommand::parse("BLT,AF").unwrap().is_ack());
        assert!(ScannerCommand::parse("ERR").unwrap().is_error());
    }

    // ---------------------------------------------------------------
    // Buffer decoding
    // ---------------------------------------------------------------

    #[test]
    fn decode_empty_buffer() {
        assert_eq!(decode_response(b""), DecodeResult::Incomplete);
    }

    #[test]
    fn decode_without_terminator() {
        assert_eq!(decode_response(b"MDL,BC12"), DecodeResult::Incomplete);
    }

    #[test]
    fn decode_complete_reply() {
        assert_eq!(
            decode_response(b"MDL,BC125AT\r"),
            DecodeResult::Reply {
                reply: ScannerCommand::new("MDL").arg("BC125AT"),
                consumed: 12,
            }
        );
    }

    #[test]
    fn decode_err_reply() {
        assert_eq!(decode_response(b"ERR\r"), DecodeResult::Error(4));
    }

    #[test]
    fn decode_skips_leading_newlines() {
        assert_eq!(
            decode_response(b"\n\rBLT,KY\r"),
            DecodeResult::Reply {
                reply: ScannerCommand::new("BLT").arg("KY"),
                consumed: 9,
            }
        );
    }

    #[test]
    fn decode_returns_first_of_several() {
        let buf = b"PRG,OK\rBLT,AO\r";
        match decode_response(buf) {
            DecodeResult::Reply { reply, consumed } => {
                assert_eq!(reply.to_string(), "PRG,OK");
                assert_eq!(consumed, 7);
                assert_eq!(
                    decode_response(&buf[consumed..]),
                    DecodeResult::Reply {
                        reply: ScannerCommand::new("BLT").arg("AO"),
                        consumed: 7,
                    }
                );
            }
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    #[test]
    fn decode_non_utf8_is_error() {
        assert_eq!(decode_response(&[0xFF, 0xFE, b'\r']), DecodeResult::Error(3));
    }
}
