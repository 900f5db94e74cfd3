mod height;
mod identifier;
mod path;
mod store;

pub use height::*;
pub use identifier::{Error as IdentifierError, Identifier};
pub use path::{Error as PathError, Path};
pub use store::*;
