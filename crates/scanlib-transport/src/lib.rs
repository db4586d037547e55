//! Transport implementations for scanlib.
//!
//! Provides [`SerialTransport`], the [`Transport`](scanlib_core::Transport)
//! used to reach a handheld scanner over its USB virtual COM port, and
//! [`find_scanner_ports`] to locate one.

pub mod serial;

pub use serial::{
    DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits, find_scanner_ports,
};
