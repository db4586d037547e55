//! Simulated handheld scanner for end-to-end tests.
//!
//! [`SimulatedScanner`] implements [`Transport`] by answering commands from
//! an in-memory register map, the way a BC125AT answers on its USB port:
//!
//! - `PRG` / `EPG` enter and leave program mode and reply `PRG,OK` / `EPG,OK`.
//! - `CODE` reads a register: `CODE,v1[,v2...]`.
//! - `CODE,a[,b...]` writes a register: `CODE,OK`.
//! - Setting registers answer `CODE,NG` outside program mode.
//! - Unknown codes, writes to identity registers, and writes with the wrong
//!   number of fields answer `ERR`.
//!
//! The simulator stores values verbatim; range and code validation is the
//! job of the code under test.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use scanlib_core::error::{Error, Result};
use scanlib_core::transport::Transport;

#[derive(Debug, Clone)]
struct Register {
    values: Vec<String>,
    /// Setting registers are writable and gated by program mode.
    setting: bool,
}

/// In-memory stand-in for a scanner on the other end of a serial port.
#[derive(Debug)]
pub struct SimulatedScanner {
    registers: HashMap<String, Register>,
    program_mode: bool,
    connected: bool,
    inbox: Vec<u8>,
    outbox: VecDeque<u8>,
    received: Vec<String>,
}

impl SimulatedScanner {
    /// An empty scanner that knows no commands besides `PRG` and `EPG`.
    pub fn new() -> Self {
        SimulatedScanner {
            registers: HashMap::new(),
            program_mode: false,
            connected: true,
            inbox: Vec::new(),
            outbox: VecDeque::new(),
            received: Vec::new(),
        }
    }

    /// A BC125AT with factory settings.
    pub fn bc125at() -> Self {
        let mut sim = Self::new();
        sim.add_identity("MDL", &["BC125AT"]);
        sim.add_identity("VER", &["Version 1.06.06"]);
        sim.add_setting("BLT", &["AF"]);
        sim.add_setting("BSV", &["9"]);
        sim.add_setting("KBP", &["0", "0"]);
        sim
    }

    /// Register a read-only identity value.
    pub fn add_identity(&mut self, code: &str, values: &[&str]) {
        self.insert(code, values, false);
    }

    /// Register a writable setting that requires program mode.
    pub fn add_setting(&mut self, code: &str, values: &[&str]) {
        self.insert(code, values, true);
    }

    fn insert(&mut self, code: &str, values: &[&str], setting: bool) {
        self.registers.insert(
            code.to_string(),
            Register {
                values: values.iter().map(|v| v.to_string()).collect(),
                setting,
            },
        );
    }

    /// Current fields of a register, if the code is known.
    pub fn register(&self, code: &str) -> Option<Vec<String>> {
        self.registers.get(code).map(|r| r.values.clone())
    }

    pub fn in_program_mode(&self) -> bool {
        self.program_mode
    }

    /// Every command line received so far, without terminators.
    pub fn received_lines(&self) -> &[String] {
        &self.received
    }

    /// Answer one command line.
    pub fn handle_line(&mut self, line: &str) -> String {
        self.received.push(line.to_string());

        let mut fields = line.split(',');
        let code = fields.next().unwrap_or_default();
        let args: Vec<&str> = fields.collect();

        match (code, args.is_empty()) {
            ("PRG", true) => {
                self.program_mode = true;
                return "PRG,OK".to_string();
            }
            ("EPG", true) => {
                self.program_mode = false;
                return "EPG,OK".to_string();
            }
            _ => {}
        }

        let program_mode = self.program_mode;
        let Some(register) = self.registers.get_mut(code) else {
            tracing::debug!(code, "simulated scanner: unknown command");
            return "ERR".to_string();
        };

        if register.setting && !program_mode {
            return format!("{code},NG");
        }

        if args.is_empty() {
            return std::iter::once(code.to_string())
                .chain(register.values.iter().cloned())
                .collect::<Vec<_>>()
                .join(",");
        }

        if !register.setting || args.len() != register.values.len() {
            return "ERR".to_string();
        }
        register.values = args.iter().map(|a| a.to_string()).collect();
        format!("{code},OK")
    }
}

impl Default for SimulatedScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for SimulatedScanner {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        self.inbox.extend_from_slice(data);

        while let Some(pos) = self.inbox.iter().position(|&b| b == b'\r') {
            let raw: Vec<u8> = self.inbox.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..pos]).into_owned();
            let reply = self.handle_line(&line);
            self.outbox.extend(reply.bytes());
            self.outbox.push_back(b'\r');
        }
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if self.outbox.is_empty() {
            return Err(Error::Timeout);
        }
        let n = self.outbox.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(self.outbox.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.outbox.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
