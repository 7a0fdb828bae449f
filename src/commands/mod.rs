//! Command domain.
//!
//! Maps the protocol client's label-keyed commands onto the host's
//! add-only command palette.

pub mod registry;

pub use registry::{derive_command_id, CommandRegistry};
