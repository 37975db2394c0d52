//! # connect-common
//!
//! Common utilities shared by the device methods: errors, derivation paths, the transport seam and
//! the [`Device`] handle.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod errors;
pub use errors::{ConnectError, ErrorKind, TransportError};

mod device;
pub use device::{Device, DeviceModel, Features};

pub mod path;
pub use path::{HARDENED, PathParam, validate_path};

mod transport;
pub use transport::Transport;
