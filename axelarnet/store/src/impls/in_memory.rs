use core::convert::Infallible;
use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::trace;

use crate::context::Store;
use crate::types::{Height, Path, RawHeight};

/// A snapshot of the store at a given height.
pub type State = BTreeMap<Path, Vec<u8>>;

/// An in-memory store backed by ordered maps.
///
/// Writes land in `pending`. `apply` checkpoints them into `staged`, `reset` rolls `pending`
/// back to the last checkpoint and `commit` seals `staged` as the next height.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    /// one state per committed height, oldest first
    store: Vec<State>,
    /// last checkpoint of the block being executed
    staged: State,
    /// writes since the last checkpoint
    pending: State,
}

impl InMemoryStore {
    #[inline]
    fn get_state(&self, height: Height) -> Option<&State> {
        match height {
            Height::Pending => Some(&self.pending),
            Height::Latest => self.store.last(),
            Height::Stable(0) => None,
            Height::Stable(height) => usize::try_from(height - 1)
                .ok()
                .and_then(|index| self.store.get(index)),
        }
    }

    /// SHA-256 over the length-prefixed key/value pairs of the latest committed state.
    pub fn root_hash(&self) -> Vec<u8> {
        let mut hasher = Sha256::new();
        if let Some(state) = self.get_state(Height::Latest) {
            for (path, value) in state {
                let key = path.to_string();
                hasher.update((key.len() as u64).to_be_bytes());
                hasher.update(key.as_bytes());
                hasher.update((value.len() as u64).to_be_bytes());
                hasher.update(value);
            }
        }
        hasher.finalize().to_vec()
    }
}

impl Store for InMemoryStore {
    type Error = Infallible;

    fn set(&mut self, path: Path, value: Vec<u8>) -> Result<Option<Vec<u8>>, Self::Error> {
        trace!("set at path = {}", path);
        Ok(self.pending.insert(path, value))
    }

    fn get(&self, height: Height, path: &Path) -> Option<Vec<u8>> {
        trace!("get at path = {} at height = {:?}", path, height);
        self.get_state(height).and_then(|v| v.get(path).cloned())
    }

    fn delete(&mut self, path: &Path) {
        trace!("delete at path = {}", path);
        self.pending.remove(path);
    }

    fn commit(&mut self) -> Result<Vec<u8>, Self::Error> {
        self.apply()?;
        trace!("committing height: {}", self.current_height());
        self.store.push(self.staged.clone());
        Ok(self.root_hash())
    }

    fn apply(&mut self) -> Result<(), Self::Error> {
        trace!("applying height: {}", self.current_height());
        self.staged = self.pending.clone();
        Ok(())
    }

    fn reset(&mut self) {
        trace!("resetting height: {}", self.current_height());
        self.pending = self.staged.clone();
    }

    fn current_height(&self) -> RawHeight {
        self.store.len() as RawHeight
    }

    fn get_keys(&self, key_prefix: &Path) -> Vec<Path> {
        self.pending
            .range(key_prefix.clone()..)
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(key_prefix))
            .cloned()
            .collect()
    }
}
