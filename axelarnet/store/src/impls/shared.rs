use std::ops::{Deref, DerefMut};
use std::sync::{Arc, RwLock};

use crate::context::{SavepointStore, Store};
use crate::types::{Height, Path, RawHeight};

/// A store handle whose clones all read and write the same state.
///
/// Keepers of different modules hold their own handle onto one application store.
#[derive(Clone, Debug)]
pub struct SharedStore<S>(Arc<RwLock<S>>);

impl<S> SharedStore<S> {
    pub fn new(store: S) -> Self {
        Self(Arc::new(RwLock::new(store)))
    }

    /// Another handle onto the same state.
    pub fn share(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<S> Default for SharedStore<S>
where
    S: Default + Store,
{
    fn default() -> Self {
        Self::new(S::default())
    }
}

// Lock poisoning means a writer panicked mid-update; the state is unusable from that point on.
impl<S> Store for SharedStore<S>
where
    S: Store,
{
    type Error = S::Error;

    #[inline]
    fn set(&mut self, path: Path, value: Vec<u8>) -> Result<Option<Vec<u8>>, Self::Error> {
        self.write().expect("poisoned store lock").set(path, value)
    }

    #[inline]
    fn get(&self, height: Height, path: &Path) -> Option<Vec<u8>> {
        self.read().expect("poisoned store lock").get(height, path)
    }

    #[inline]
    fn delete(&mut self, path: &Path) {
        self.write().expect("poisoned store lock").delete(path)
    }

    #[inline]
    fn commit(&mut self) -> Result<Vec<u8>, Self::Error> {
        self.write().expect("poisoned store lock").commit()
    }

    #[inline]
    fn apply(&mut self) -> Result<(), Self::Error> {
        self.write().expect("poisoned store lock").apply()
    }

    #[inline]
    fn reset(&mut self) {
        self.write().expect("poisoned store lock").reset()
    }

    #[inline]
    fn current_height(&self) -> RawHeight {
        self.read().expect("poisoned store lock").current_height()
    }

    #[inline]
    fn get_keys(&self, key_prefix: &Path) -> Vec<Path> {
        self.read().expect("poisoned store lock").get_keys(key_prefix)
    }
}

impl<S> SavepointStore for SharedStore<S>
where
    S: SavepointStore,
{
    #[inline]
    fn savepoint(&self) -> usize {
        self.read().expect("poisoned store lock").savepoint()
    }

    #[inline]
    fn rollback_to(&mut self, savepoint: usize) {
        self.write()
            .expect("poisoned store lock")
            .rollback_to(savepoint)
    }
}

impl<S> Deref for SharedStore<S> {
    type Target = Arc<RwLock<S>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> DerefMut for SharedStore<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryStore;

    #[test]
    fn clones_observe_the_same_state() {
        let mut a = SharedStore::new(InMemoryStore::default());
        let b = a.share();
        let path = Path::try_from("k".to_owned()).unwrap();
        a.set(path.clone(), vec![7]).unwrap();
        assert_eq!(b.get(Height::Pending, &path), Some(vec![7]));
    }
}
