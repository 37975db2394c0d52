//! # connect-ethereum
//!
//! Ethereum methods for hardware wallets: EIP-712 typed data signing.
//!
//! ```ignore
//! use connect_ethereum::{TypedData, sign_typed_data};
//!
//! let data = TypedData::from_json(json)?;
//! let signed = sign_typed_data(&mut device, "m/44'/60'/0'/0/0", data, true).await?;
//! println!("{} signed {}", signed.address, signed.signature);
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod eip712;
pub use eip712::{TypedData, TypedDataError, TypedValue};

pub mod network;

mod sign_typed_data;
pub use sign_typed_data::{EthereumSignTypedData, SignedTypedData, sign_typed_data};
