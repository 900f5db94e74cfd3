use core::marker::PhantomData;

use super::{Height, Path, RawHeight};
use crate::context::Store;
use crate::utils::{Codec, JsonCodec, ProtobufCodec};

/// A `TypedStore` that uses the `JsonCodec`
pub type JsonStore<S, K, V> = TypedStore<S, K, JsonCodec<V>>;

/// A `TypedStore` that uses the `ProtobufCodec`
pub type ProtobufStore<S, K, V, R> = TypedStore<S, K, ProtobufCodec<V, R>>;

/// A typed view over a store: keys of type `K` and values encoded by the codec `C`.
#[derive(Clone, Debug)]
pub struct TypedStore<S, K, C> {
    store: S,
    _key: PhantomData<K>,
    _codec: PhantomData<C>,
}

impl<S, K, C, V> TypedStore<S, K, C>
where
    S: Store,
    C: for<'a> Codec<'a, Type = V>,
    K: Into<Path> + Clone,
{
    #[inline]
    pub fn new(store: S) -> Self {
        Self {
            store,
            _codec: PhantomData,
            _key: PhantomData,
        }
    }

    #[inline]
    pub fn set(&mut self, path: K, value: V) -> Result<Option<V>, S::Error> {
        let encoded = C::encode(&value).expect("json and protobuf encoding of domain types cannot fail");
        self.store
            .set(path.into(), encoded.as_ref().to_vec())
            .map(|prev_val| prev_val.and_then(|v| C::decode(&v)))
    }

    #[inline]
    pub fn get(&self, height: Height, path: &K) -> Option<V> {
        self.store
            .get(height, &path.clone().into())
            .and_then(|v| C::decode(&v))
    }

    /// Returns the raw, undecoded bytes stored at `path`.
    #[inline]
    pub fn get_raw(&self, height: Height, path: &K) -> Option<Vec<u8>> {
        self.store.get(height, &path.clone().into())
    }

    #[inline]
    pub fn delete(&mut self, path: &K) {
        self.store.delete(&path.clone().into())
    }

    #[inline]
    pub fn has(&self, height: Height, path: &K) -> bool {
        self.store.get(height, &path.clone().into()).is_some()
    }

    #[inline]
    pub fn get_keys(&self, key_prefix: &Path) -> Vec<Path> {
        self.store.get_keys(key_prefix)
    }

    #[inline]
    pub fn current_height(&self) -> RawHeight {
        self.store.current_height()
    }
}
