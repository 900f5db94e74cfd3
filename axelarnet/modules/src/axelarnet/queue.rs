use std::collections::BTreeSet;

use axelarnet_store::context::Store;
use axelarnet_store::impls::SharedStore;
use axelarnet_store::types::{Height, Path};
use prost::Message;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::error::Error;
use super::types::{IbcTransfer, RawIbcTransfer};

pub const ROUTE_TRANSFER_QUEUE_NAME: &str = "route_transfer_queue";

const QUEUE_PREFIX: &str = "queue";

/// A durable FIFO of transfers, ordered by transfer id.
#[derive(Clone, Debug)]
pub struct KvQueue<S> {
    name: String,
    store: SharedStore<S>,
}

impl<S: Store> KvQueue<S> {
    pub fn new(name: impl Into<String>, store: SharedStore<S>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    pub fn route_transfer_queue(store: SharedStore<S>) -> Self {
        Self::new(ROUTE_TRANSFER_QUEUE_NAME, store)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn prefix(&self) -> Path {
        format!("{QUEUE_PREFIX}/{}", self.name)
            .try_into()
            .unwrap() // safety - queue names are static identifiers
    }

    fn item_path(&self, transfer: &IbcTransfer) -> Path {
        format!("{QUEUE_PREFIX}/{}/{:020}", self.name, transfer.id.0)
            .try_into()
            .unwrap() // safety - queue names are static identifiers
    }

    pub fn enqueue(&mut self, transfer: &IbcTransfer) -> Result<(), Error> {
        let raw = RawIbcTransfer::from(transfer.clone());
        trace!("enqueueing transfer {} into {}", transfer.id, self.name);
        self.store
            .set(self.item_path(transfer), raw.encode_to_vec())
            .map(|_| ())
            .map_err(Error::store)
    }

    /// Pops the oldest item. The item is consumed even when it fails to decode.
    pub fn dequeue(&mut self) -> Result<Option<IbcTransfer>, Error> {
        let Some(key) = self.store.get_keys(&self.prefix()).into_iter().next() else {
            return Ok(None);
        };
        let bytes = self.store.get(Height::Pending, &key).unwrap_or_default();
        self.store.delete(&key);

        match decode_transfer(&bytes) {
            Ok(transfer) => Ok(Some(transfer)),
            Err(e) => {
                warn!("dropping undecodable queue item {}: {}", key, e);
                Err(e)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.store.get_keys(&self.prefix()).len()
    }

    pub fn export_state(&self) -> QueueState {
        let items = self
            .store
            .get_keys(&self.prefix())
            .into_iter()
            .filter_map(|key| {
                let value = self.store.get(Height::Pending, &key)?;
                Some(QueueItem {
                    key: key.to_string(),
                    value,
                })
            })
            .collect();

        QueueState {
            name: self.name.clone(),
            items,
        }
    }

    pub fn import_state(&mut self, state: &QueueState) -> Result<(), Error> {
        if state.name != self.name {
            return Err(Error::InvalidQueueState {
                reason: format!("expected queue {}, got {}", self.name, state.name),
            });
        }
        state.validate()?;

        for item in &state.items {
            let transfer = decode_transfer(&item.value)?;
            self.enqueue(&transfer)?;
        }
        Ok(())
    }
}

fn decode_transfer(bytes: &[u8]) -> Result<IbcTransfer, Error> {
    let raw = RawIbcTransfer::decode(bytes).map_err(|e| Error::InvalidQueueState {
        reason: e.to_string(),
    })?;
    IbcTransfer::try_from(raw)
}

/// One exported queue entry: the store key and the protobuf encoded transfer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub key: String,
    #[serde(with = "base64_bytes")]
    pub value: Vec<u8>,
}

/// Portable form of a queue, as carried in genesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueState {
    pub name: String,
    #[serde(default)]
    pub items: Vec<QueueItem>,
}

impl Default for QueueState {
    fn default() -> Self {
        Self {
            name: ROUTE_TRANSFER_QUEUE_NAME.to_owned(),
            items: vec![],
        }
    }
}

impl QueueState {
    /// Checks names and keys, and that every value decodes into a valid transfer whose
    /// re-encoding reproduces the stored bytes.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |reason: String| Error::InvalidQueueState { reason };

        if self.name.is_empty() {
            return Err(invalid("empty queue name".to_owned()));
        }

        let prefix = format!("{QUEUE_PREFIX}/{}/", self.name);
        let mut seen = BTreeSet::new();
        for item in &self.items {
            if !item.key.starts_with(&prefix) || Path::try_from(item.key.clone()).is_err() {
                return Err(invalid(format!("key {} is outside of queue {}", item.key, self.name)));
            }
            if !seen.insert(item.key.as_str()) {
                return Err(invalid(format!("duplicate key {}", item.key)));
            }

            let transfer = decode_transfer(&item.value)?;
            transfer.validate_basic()?;
            if RawIbcTransfer::from(transfer).encode_to_vec() != item.value {
                return Err(invalid(format!("value under {} is not canonical", item.key)));
            }
        }
        Ok(())
    }

    pub fn transfers(&self) -> Result<Vec<IbcTransfer>, Error> {
        self.items
            .iter()
            .map(|item| decode_transfer(&item.value))
            .collect()
    }
}

pub(super) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        BASE64.decode(s).map_err(D::Error::custom)
    }
}
