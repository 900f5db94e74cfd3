use core::fmt::Debug;

use crate::types::{Height, Path, RawHeight};

/// Store trait - maybe provableStore or privateStore
pub trait Store: Send + Sync + Clone {
    /// Error type - expected to envelope all possible errors in store
    type Error: Debug;

    /// Set `value` for `path`
    fn set(&mut self, path: Path, value: Vec<u8>) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Get associated `value` for `path` at specified `height`
    fn get(&self, height: Height, path: &Path) -> Option<Vec<u8>>;

    /// Delete specified `path`
    fn delete(&mut self, path: &Path);

    /// Commit `Pending` block to canonical chain and create new `Pending`
    fn commit(&mut self) -> Result<Vec<u8>, Self::Error>;

    /// Apply accumulated changes to `Pending`
    ///
    /// Everything written before this call survives a subsequent `reset()`.
    fn apply(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Reset accumulated changes since the last `apply()`
    fn reset(&mut self) {}

    /// Return the current height of the chain
    fn current_height(&self) -> RawHeight;

    /// Return all keys that start with specified prefix, in ascending key order
    fn get_keys(&self, key_prefix: &Path) -> Vec<Path>;
}

/// A store that can undo its writes back to a savepoint while everything written before the
/// savepoint stays pending.
///
/// Savepoints nest: rolling back to an outer savepoint also undoes the writes of inner ones.
pub trait SavepointStore: Store {
    /// Marks the current position in the write history
    fn savepoint(&self) -> usize;

    /// Undoes every write made after `savepoint`
    fn rollback_to(&mut self, savepoint: usize);
}
