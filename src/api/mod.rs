//! API types for the host/client bridge.
//!
//! This module defines the stable types both sides exchange,
//! isolating storage and registration details from either collaborator.

pub mod types;
