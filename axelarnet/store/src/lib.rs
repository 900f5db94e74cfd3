#![forbid(unsafe_code)]
#![deny(
    warnings,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications,
    rust_2018_idioms
)]

pub mod context;
pub mod impls;
pub mod types;
pub mod utils;
