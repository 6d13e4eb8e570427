//! EVM chain support for the wallet session.
//!
//! This crate provides:
//! - The recipient address surface check used before building transfers
//! - EIP-55 checksum encoding and public key to address derivation
//! - EVM network presets for the network registry

pub mod address;
pub mod error;
pub mod networks;
