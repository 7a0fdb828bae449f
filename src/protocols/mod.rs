//! Protocol layer - the two boundaries the bridge sits between.
//!
//! This module provides:
//! - `HostCommands`, `HostNotices`, `HostPersistence`, `HostOverlays`:
//!   bridge → host application boundary
//! - `ClientHost`: protocol client → bridge callback boundary
//! - `ProtocolClient` / `ProtocolClientFactory`: the opaque external client

pub mod client;
pub mod host;

pub use client::{ClientHost, CommandCallback, ProtocolClient, ProtocolClientFactory};
pub use host::{
    CommandTrampoline, HostBindings, HostCommand, HostCommands, HostNotices, HostOverlays,
    HostPersistence,
};
