//! Substrate chain support for the wallet session.
//!
//! - Recipient address surface check (length and prefix only)
//! - SS58 encoding of 32-byte account ids
//! - Substrate network presets for the network registry

pub mod address;
pub mod error;
pub mod networks;
