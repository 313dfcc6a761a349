//! nest-snapshot library
//!
//! Fetches a single frame from a publicly shared Nest camera link through the
//! unofficial share API (login, camera lookup, snapshot) and writes it out as
//! PNG or JPEG.

pub mod cli;
pub mod config;
pub mod logging;
pub mod security;
pub mod snapshot;
