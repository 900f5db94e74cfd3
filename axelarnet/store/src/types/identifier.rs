use core::fmt::{Display, Formatter};
use core::ops::Deref;

use displaydoc::Display as DisplayDoc;

#[derive(Debug, DisplayDoc, PartialEq, Eq)]
pub enum Error {
    /// `{identifier}` is not a valid identifier
    InvalidIdentifier { identifier: String },
}

/// A newtype representing a single segment of a store `Path`.
///
/// Identifiers are non-empty and consist of ASCII alphanumerics and `.`, `_`, `+`, `-`, `#`,
/// `[`, `]`, `<`, `>` only.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Clone, Hash)]
pub struct Identifier(String);

impl Identifier {
    #[inline]
    pub fn is_valid(s: impl AsRef<str>) -> bool {
        let s = s.as_ref();
        if s.is_empty() {
            return false;
        }
        s.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '.' | '_' | '+' | '-' | '#' | '[' | ']' | '<' | '>')
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Identifier {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if Identifier::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(Error::InvalidIdentifier { identifier: s })
        }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
