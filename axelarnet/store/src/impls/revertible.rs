use tracing::trace;

use crate::context::{SavepointStore, Store};
use crate::types::{Height, Path, RawHeight};

/// Adds checkpoint and rollback to a store that writes through immediately.
///
/// Every write records its inverse. `reset` replays the whole log backwards, `rollback_to` only
/// the part after a savepoint, and `apply` forgets it. None of these reach the inner store, so
/// wrappers can be stacked.
#[derive(Clone, Debug)]
pub struct RevertibleStore<S> {
    store: S,
    /// inverse operations since the last checkpoint, oldest first
    op_log: Vec<RevertOp>,
}

#[derive(Clone, Debug)]
enum RevertOp {
    Delete(Path),
    Set(Path, Vec<u8>),
}

impl<S> RevertibleStore<S>
where
    S: Store,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            op_log: vec![],
        }
    }
}

impl<S> Default for RevertibleStore<S>
where
    S: Default + Store,
{
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> Store for RevertibleStore<S>
where
    S: Store,
{
    type Error = S::Error;

    #[inline]
    fn set(&mut self, path: Path, value: Vec<u8>) -> Result<Option<Vec<u8>>, Self::Error> {
        let previous = self.store.set(path.clone(), value)?;
        let inverse = match &previous {
            None => RevertOp::Delete(path),
            Some(previous) => RevertOp::Set(path, previous.clone()),
        };
        self.op_log.push(inverse);
        Ok(previous)
    }

    #[inline]
    fn get(&self, height: Height, path: &Path) -> Option<Vec<u8>> {
        self.store.get(height, path)
    }

    #[inline]
    fn delete(&mut self, path: &Path) {
        let Some(previous) = self.store.get(Height::Pending, path) else {
            return;
        };
        self.store.delete(path);
        self.op_log.push(RevertOp::Set(path.clone(), previous));
    }

    #[inline]
    fn commit(&mut self) -> Result<Vec<u8>, Self::Error> {
        self.apply()?;
        self.store.commit()
    }

    #[inline]
    fn apply(&mut self) -> Result<(), Self::Error> {
        self.op_log.clear();
        Ok(())
    }

    #[inline]
    fn reset(&mut self) {
        self.rollback_to(0);
    }

    #[inline]
    fn current_height(&self) -> RawHeight {
        self.store.current_height()
    }

    #[inline]
    fn get_keys(&self, key_prefix: &Path) -> Vec<Path> {
        self.store.get_keys(key_prefix)
    }
}

impl<S> SavepointStore for RevertibleStore<S>
where
    S: Store,
{
    fn savepoint(&self) -> usize {
        self.op_log.len()
    }

    fn rollback_to(&mut self, savepoint: usize) {
        let undone = self.op_log.split_off(savepoint.min(self.op_log.len()));
        trace!(ops = undone.len(), "rolling back store writes");
        for op in undone.into_iter().rev() {
            match op {
                RevertOp::Delete(path) => self.store.delete(&path),
                RevertOp::Set(path, value) => {
                    // safety - rollback failures are unrecoverable
                    self.store
                        .set(path, value)
                        .expect("failed to roll back store write");
                }
            }
        }
    }
}
