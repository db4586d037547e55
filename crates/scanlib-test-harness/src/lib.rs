//! scanlib-test-harness: transports for testing scanlib without hardware.
//!
//! - [`MockTransport`] replays a fixed script of request/response pairs.
//! - [`SimulatedScanner`] keeps scanner state and answers any sequence of
//!   commands, for end-to-end read/write workflows.

pub mod mock_serial;
pub mod sim_scanner;

pub use mock_serial::MockTransport;
pub use sim_scanner::SimulatedScanner;
