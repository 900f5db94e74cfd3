mod in_memory;
mod revertible;
mod shared;

pub use in_memory::*;
pub use revertible::*;
pub use shared::*;
