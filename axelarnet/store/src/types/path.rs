use core::fmt::{Display, Formatter};
use core::str::{from_utf8, Utf8Error};

use displaydoc::Display as DisplayDoc;

use super::identifier::{Error as IdentifierError, Identifier};

#[derive(Debug, DisplayDoc)]
pub enum Error {
    /// path isn't a valid string: `{error}`
    MalformedPathString { error: Utf8Error },
    /// invalid path segment: `{0}`
    InvalidSegment(IdentifierError),
}

/// A store key made of `/`-separated identifiers.
///
/// Ordering is segment-wise, so `a/b` sorts before `a/b/c` and zero-padded numeric segments
/// sort numerically.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Clone, Hash)]
pub struct Path(Vec<Identifier>);

impl Path {
    pub fn get(&self, index: usize) -> Option<&Identifier> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if every segment of `prefix` matches the leading segments of `self`.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Returns the last segment, i.e. the key relative to its parent prefix.
    pub fn last(&self) -> Option<&Identifier> {
        self.0.last()
    }
}

impl TryFrom<String> for Path {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let identifiers = s
            .split('/') // split will never return an empty iterator
            .map(|part| Identifier::try_from(part.to_owned()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(Error::InvalidSegment)?;
        Ok(Self(identifiers))
    }
}

impl TryFrom<&[u8]> for Path {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let s = from_utf8(value).map_err(|e| Error::MalformedPathString { error: e })?;
        s.to_owned().try_into()
    }
}

impl From<Identifier> for Path {
    fn from(id: Identifier) -> Self {
        Self(vec![id])
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .iter()
                .map(|iden| iden.as_str().to_owned())
                .collect::<Vec<String>>()
                .join("/")
        )
    }
}
