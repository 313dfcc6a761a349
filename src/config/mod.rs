//! Run configuration
//!
//! Plain structs built once by the CLI and passed into each component.

pub mod types;

pub use types::*;
