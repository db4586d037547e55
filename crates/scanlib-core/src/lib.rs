//! scanlib-core: error definitions and the transport trait shared by every
//! scanlib crate.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel
//! - [`Error`] / [`DecodeError`] / [`Result`] -- error handling

pub mod error;
pub mod transport;

pub use error::{DecodeError, Error, Result};
pub use transport::Transport;
