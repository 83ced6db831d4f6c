//! This file is the root of the `muara_stream` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`engine`, `stream`,
//!     etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the small public surface: the two streaming adapters,
//!     their configuration, and the shared error type.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod config;
pub mod engine;
pub mod stream;

mod error;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use config::{CompressionProfile, StreamConfig, DEFAULT_BUFFER_SIZE};
pub use error::MuaraError;
pub use observability::enable_verbose_logging;
pub use stream::{StreamReader, StreamWriter};
