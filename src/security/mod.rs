//! Security utilities module
//!
//! Keeps share tokens, link passwords and session credentials out of logs
//! and error output.

pub mod logging;
