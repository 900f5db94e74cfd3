#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(
    warnings,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications,
    rust_2018_idioms
)]

pub mod cli;
pub mod config;
mod runner;

pub use runner::run;

/// Re-exports axelarnet's store types and implementations.
pub mod store {
    pub use axelarnet_store::*;
}

/// Re-exports axelarnet's modules types and implementations.
pub mod modules {
    pub use axelarnet_modules::*;
}
