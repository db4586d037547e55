//! Scripted mock transport for deterministic protocol tests.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs. Each `send()` must match the next expected
//! request exactly; the paired response is then handed out by `receive()`.
//!
//! # Example
//!
//! ```
//! use scanlib_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // Lines are `\r`-terminated on the wire; `expect_line` adds the terminator.
//! mock.expect_line("MDL", "MDL,BC125AT");
//! mock.expect(b"BLT\r", b"BLT,AF\r");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use scanlib_core::error::{Error, Result};
use scanlib_core::transport::Transport;

#[derive(Debug, Clone)]
struct Expectation {
    request: Vec<u8>,
    /// `None` scripts a scanner that never answers.
    response: Option<Vec<u8>>,
}

/// A mock [`Transport`] for testing without hardware.
///
/// Expectations are consumed in order. A mismatching or unexpected `send()`
/// fails with [`Error::Protocol`]; a `receive()` with nothing pending fails
/// with [`Error::Timeout`].
#[derive(Debug)]
pub struct MockTransport {
    expectations: VecDeque<Expectation>,
    pending_response: Option<Vec<u8>>,
    response_cursor: usize,
    connected: bool,
    sent_log: Vec<Vec<u8>>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            pending_response: None,
            response_cursor: 0,
            connected: true,
            sent_log: Vec::new(),
        }
    }

    /// Add an expected request/response pair of raw bytes.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: Some(response.to_vec()),
        });
    }

    /// Add an expected exchange of text lines; both get a `\r` appended.
    pub fn expect_line(&mut self, request: &str, response: &str) {
        self.expect(
            format!("{request}\r").as_bytes(),
            format!("{response}\r").as_bytes(),
        );
    }

    /// Expect `request` but never answer it, so the reader times out.
    pub fn expect_silence(&mut self, request: &str) {
        self.expectations.push_back(Expectation {
            request: format!("{request}\r").into_bytes(),
            response: None,
        });
    }

    /// All data sent through this transport, one element per `send()`.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Sent data as text lines with the terminator stripped.
    pub fn sent_lines(&self) -> Vec<String> {
        self.sent_log
            .iter()
            .map(|raw| String::from_utf8_lossy(raw).trim_end_matches('\r').to_string())
            .collect()
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// When set to `false`, `send()` and `receive()` return
    /// [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.sent_log.push(data.to_vec());

        let Some(expectation) = self.expectations.pop_front() else {
            return Err(Error::Protocol(format!(
                "no more expectations in mock transport (sent {:?})",
                String::from_utf8_lossy(data)
            )));
        };
        if data != expectation.request.as_slice() {
            return Err(Error::Protocol(format!(
                "unexpected send data: expected {:?}, got {:?}",
                String::from_utf8_lossy(&expectation.request),
                String::from_utf8_lossy(data)
            )));
        }
        self.pending_response = expectation.response;
        self.response_cursor = 0;
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        let Some(response) = self.pending_response.as_ref() else {
            return Err(Error::Timeout);
        };
        let remaining = &response[self.response_cursor..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.response_cursor += n;
        if self.response_cursor >= response.len() {
            self.pending_response = None;
            self.response_cursor = 0;
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending_response = None;
        self.response_cursor = 0;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
