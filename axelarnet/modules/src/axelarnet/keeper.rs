use axelarnet_store::context::Store;
use axelarnet_store::impls::SharedStore;
use axelarnet_store::types::{Height, JsonStore, Path, ProtobufStore};
use axelarnet_store::utils::{Codec, JsonCodec, ProtobufCodec};
use ibc::core::host::types::identifiers::Sequence;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::Error;
use super::nexus::{ChainName, TransferId};
use super::queue::KvQueue;
use super::types::{CosmosChain, IbcPath, IbcTransfer, Params, RawIbcTransfer, TransferStatus};

const COSMOS_CHAIN_PREFIX: &str = "cosmos_chain";
const TRANSFER_PREFIX: &str = "transfer";
const SEQ_ID_PREFIX: &str = "seq_id";

#[derive(Clone, Debug)]
pub(super) struct ParamsPath;

impl From<ParamsPath> for Path {
    fn from(_: ParamsPath) -> Self {
        "params".to_owned().try_into().unwrap() // safety - static identifier
    }
}

#[derive(Clone, Debug)]
pub(super) struct CosmosChainPath(pub ChainName);

impl From<CosmosChainPath> for Path {
    fn from(path: CosmosChainPath) -> Self {
        format!("{COSMOS_CHAIN_PREFIX}/{}", path.0.to_key())
            .try_into()
            .unwrap() // safety - chain names are validated identifiers
    }
}

#[derive(Clone, Debug)]
pub(super) struct ChainByIbcPath(pub IbcPath);

impl From<ChainByIbcPath> for Path {
    fn from(path: ChainByIbcPath) -> Self {
        format!("chain_by_ibc_path/{}", path.0).try_into().unwrap() // safety - port and channel ids are valid identifiers
    }
}

#[derive(Clone, Debug)]
pub(super) struct TransferPath(pub TransferId);

impl From<TransferPath> for Path {
    fn from(path: TransferPath) -> Self {
        format!("{TRANSFER_PREFIX}/{:020}", path.0 .0)
            .try_into()
            .unwrap() // safety - numeric identifier
    }
}

#[derive(Clone, Debug)]
pub(super) struct SeqIdPath(pub IbcPath, pub Sequence);

impl From<SeqIdPath> for Path {
    fn from(SeqIdPath(path, seq): SeqIdPath) -> Self {
        format!("{SEQ_ID_PREFIX}/{path}/{:020}", u64::from(seq))
            .try_into()
            .unwrap() // safety - port and channel ids are valid identifiers
    }
}

#[derive(Clone, Debug)]
pub(super) struct SeqMessageIdPath(pub IbcPath, pub Sequence);

impl From<SeqMessageIdPath> for Path {
    fn from(SeqMessageIdPath(path, seq): SeqMessageIdPath) -> Self {
        format!("seq_message_id/{path}/{:020}", u64::from(seq))
            .try_into()
            .unwrap() // safety - port and channel ids are valid identifiers
    }
}

fn prefix(prefix: &str) -> Path {
    prefix.to_owned().try_into().unwrap() // safety - static identifier
}

/// A `(port/channel, sequence) -> transfer id` correlation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqIdMapping {
    pub path: IbcPath,
    pub sequence: Sequence,
    pub id: TransferId,
}

/// Persistent state of the gateway: params, cosmos chain registry, transfer records, sequence
/// mappings and the outbound transfer queue.
#[derive(Clone, Debug)]
pub struct Keeper<S> {
    store: SharedStore<S>,
    params: JsonStore<SharedStore<S>, ParamsPath, Params>,
    chains: JsonStore<SharedStore<S>, CosmosChainPath, CosmosChain>,
    chain_by_path: JsonStore<SharedStore<S>, ChainByIbcPath, ChainName>,
    transfers: ProtobufStore<SharedStore<S>, TransferPath, IbcTransfer, RawIbcTransfer>,
    seq_ids: JsonStore<SharedStore<S>, SeqIdPath, TransferId>,
    seq_message_ids: JsonStore<SharedStore<S>, SeqMessageIdPath, String>,
}

impl<S: Store> Keeper<S> {
    pub fn new(store: SharedStore<S>) -> Self {
        Self {
            params: JsonStore::new(store.clone()),
            chains: JsonStore::new(store.clone()),
            chain_by_path: JsonStore::new(store.clone()),
            transfers: ProtobufStore::new(store.clone()),
            seq_ids: JsonStore::new(store.clone()),
            seq_message_ids: JsonStore::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &SharedStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SharedStore<S> {
        &mut self.store
    }

    pub fn get_params(&self) -> Params {
        self.params
            .get(Height::Pending, &ParamsPath)
            .unwrap_or_default()
    }

    pub fn set_params(&mut self, params: Params) -> Result<(), Error> {
        params.validate()?;
        self.params
            .set(ParamsPath, params)
            .map(|_| ())
            .map_err(Error::store)
    }

    pub fn get_cosmos_chain(&self, chain: &ChainName) -> Option<CosmosChain> {
        self.chains
            .get(Height::Pending, &CosmosChainPath(chain.clone()))
    }

    pub fn set_cosmos_chain(&mut self, chain: CosmosChain) -> Result<(), Error> {
        self.chains
            .set(CosmosChainPath(chain.name.clone()), chain)
            .map(|_| ())
            .map_err(Error::store)
    }

    /// All registered cosmos chains, ordered by name.
    pub fn get_cosmos_chains(&self) -> Vec<CosmosChain> {
        self.decode_all::<JsonCodec<CosmosChain>, _>(COSMOS_CHAIN_PREFIX)
    }

    pub fn get_ibc_path(&self, chain: &ChainName) -> Option<IbcPath> {
        self.get_cosmos_chain(chain).and_then(|c| c.ibc_path)
    }

    pub fn get_chain_name_by_ibc_path(&self, path: &IbcPath) -> Option<ChainName> {
        self.chain_by_path
            .get(Height::Pending, &ChainByIbcPath(path.clone()))
    }

    /// Binds `path` to `chain` in both directions.
    ///
    /// A chain keeps its path for life and a path serves a single chain; re-registering the
    /// same pair is a no-op.
    pub fn register_ibc_path(&mut self, chain: &ChainName, path: IbcPath) -> Result<(), Error> {
        let mut cosmos_chain =
            self.get_cosmos_chain(chain)
                .ok_or_else(|| Error::UnknownCosmosChain {
                    chain: chain.to_string(),
                })?;

        if let Some(owner) = self.get_chain_name_by_ibc_path(&path) {
            if &owner != chain {
                return Err(Error::IbcPathTaken {
                    path: path.to_string(),
                    chain: owner.to_string(),
                });
            }
        }

        match &cosmos_chain.ibc_path {
            Some(existing) if existing == &path => return Ok(()),
            Some(existing) => {
                return Err(Error::IbcPathAlreadySet {
                    chain: chain.to_string(),
                    path: existing.to_string(),
                })
            }
            None => {}
        }

        cosmos_chain.ibc_path = Some(path.clone());
        self.set_cosmos_chain(cosmos_chain)?;
        self.chain_by_path
            .set(ChainByIbcPath(path.clone()), chain.clone())
            .map_err(Error::store)?;

        info!("registered IBC path {} for chain {}", path, chain);
        Ok(())
    }

    pub fn get_transfer(&self, id: TransferId) -> Option<IbcTransfer> {
        self.transfers.get(Height::Pending, &TransferPath(id))
    }

    pub fn set_transfer(&mut self, transfer: IbcTransfer) -> Result<(), Error> {
        self.transfers
            .set(TransferPath(transfer.id), transfer)
            .map(|_| ())
            .map_err(Error::store)
    }

    /// All transfer records, ordered by id.
    pub fn get_transfers(&self) -> Vec<IbcTransfer> {
        self.decode_all::<ProtobufCodec<IbcTransfer, RawIbcTransfer>, _>(TRANSFER_PREFIX)
    }

    pub fn set_transfer_completed(&mut self, id: TransferId) -> Result<(), Error> {
        self.set_transfer_status(id, TransferStatus::Completed)
    }

    pub fn set_transfer_failed(&mut self, id: TransferId) -> Result<(), Error> {
        self.set_transfer_status(id, TransferStatus::Failed)
    }

    pub fn set_transfer_pending(&mut self, id: TransferId) -> Result<(), Error> {
        self.set_transfer_status(id, TransferStatus::Pending)
    }

    fn set_transfer_status(&mut self, id: TransferId, status: TransferStatus) -> Result<(), Error> {
        let mut transfer = self
            .get_transfer(id)
            .ok_or(Error::TransferNotFound { id: id.0 })?;
        transfer.set_status(status)?;
        debug!("transfer {} is now {}", id, status);
        self.set_transfer(transfer)
    }

    /// Saves the transfer record and appends it to the outbound queue.
    pub fn enqueue_ibc_transfer(&mut self, transfer: IbcTransfer) -> Result<(), Error> {
        transfer.validate_basic()?;
        self.set_transfer(transfer.clone())?;
        self.transfer_queue().enqueue(&transfer)
    }

    pub fn transfer_queue(&self) -> KvQueue<S> {
        KvQueue::route_transfer_queue(self.store.clone())
    }

    pub fn set_seq_id_mapping(
        &mut self,
        path: &IbcPath,
        sequence: Sequence,
        id: TransferId,
    ) -> Result<(), Error> {
        self.seq_ids
            .set(SeqIdPath(path.clone(), sequence), id)
            .map(|_| ())
            .map_err(Error::store)
    }

    pub fn get_seq_id_mapping(&self, path: &IbcPath, sequence: Sequence) -> Option<TransferId> {
        self.seq_ids
            .get(Height::Pending, &SeqIdPath(path.clone(), sequence))
    }

    pub fn delete_seq_id_mapping(&mut self, path: &IbcPath, sequence: Sequence) {
        self.seq_ids.delete(&SeqIdPath(path.clone(), sequence))
    }

    /// All transfer sequence mappings, ordered by key.
    pub fn get_seq_id_mappings(&self) -> Vec<SeqIdMapping> {
        self.store
            .get_keys(&prefix(SEQ_ID_PREFIX))
            .into_iter()
            .filter_map(|key| {
                let path = format!("{}/{}", key.get(1)?, key.get(2)?).parse().ok()?;
                let sequence = Sequence::from(key.get(3)?.parse::<u64>().ok()?);
                let id = self.get_seq_id_mapping(&path, sequence)?;
                Some(SeqIdMapping { path, sequence, id })
            })
            .collect()
    }

    /// Maps `(path, sequence)` to a general message id. A key can only be mapped once.
    pub fn set_seq_message_id_mapping(
        &mut self,
        path: &IbcPath,
        sequence: Sequence,
        id: String,
    ) -> Result<(), Error> {
        let key = SeqMessageIdPath(path.clone(), sequence);
        if self.seq_message_ids.has(Height::Pending, &key) {
            return Err(Error::MappingAlreadySet {
                port: path.port_id.to_string(),
                channel: path.channel_id.to_string(),
                sequence: u64::from(sequence),
            });
        }
        self.seq_message_ids
            .set(key, id)
            .map(|_| ())
            .map_err(Error::store)
    }

    pub fn get_seq_message_id_mapping(&self, path: &IbcPath, sequence: Sequence) -> Option<String> {
        self.seq_message_ids
            .get(Height::Pending, &SeqMessageIdPath(path.clone(), sequence))
    }

    pub fn delete_seq_message_id_mapping(&mut self, path: &IbcPath, sequence: Sequence) {
        self.seq_message_ids
            .delete(&SeqMessageIdPath(path.clone(), sequence))
    }

    fn decode_all<C, V>(&self, key_prefix: &str) -> Vec<V>
    where
        C: for<'a> Codec<'a, Type = V>,
    {
        self.store
            .get_keys(&prefix(key_prefix))
            .into_iter()
            .filter_map(|key| self.store.get(Height::Pending, &key))
            .filter_map(|bytes| C::decode(&bytes))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use axelarnet_store::impls::InMemoryStore;
    use cosmrs::AccountId;
    use ibc::core::host::types::identifiers::{ChannelId, PortId};

    use super::*;
    use crate::bank::Coin;

    fn keeper() -> Keeper<InMemoryStore> {
        Keeper::new(SharedStore::new(InMemoryStore::default()))
    }

    fn chain(name: &str) -> CosmosChain {
        CosmosChain {
            name: ChainName::new(name).unwrap(),
            ibc_path: None,
            addr_prefix: name.to_owned(),
        }
    }

    fn path(channel: u64) -> IbcPath {
        IbcPath::new(PortId::transfer(), ChannelId::new(channel))
    }

    fn transfer(id: u64) -> IbcTransfer {
        IbcTransfer::new(
            TransferId(id),
            AccountId::new("axelar", &[1; 20]).unwrap(),
            "osmo1receiver".to_owned(),
            Coin::new("uaxl", 10u64),
            PortId::transfer(),
            ChannelId::new(0),
        )
    }

    #[test]
    fn params_default_until_set() {
        let mut k = keeper();
        assert_eq!(k.get_params(), Params::default());

        let params = Params {
            end_blocker_limit: 5,
            ..Params::default()
        };
        k.set_params(params.clone()).unwrap();
        assert_eq!(k.get_params(), params);

        let invalid = Params {
            transfer_limit: 0,
            ..Params::default()
        };
        assert!(k.set_params(invalid).is_err());
    }

    #[test]
    fn ibc_path_is_bijective() {
        let mut k = keeper();
        k.set_cosmos_chain(chain("osmosis")).unwrap();
        k.set_cosmos_chain(chain("cosmoshub")).unwrap();
        let osmosis = ChainName::new("osmosis").unwrap();
        let cosmoshub = ChainName::new("cosmoshub").unwrap();

        k.register_ibc_path(&osmosis, path(1)).unwrap();
        assert_eq!(k.get_ibc_path(&osmosis), Some(path(1)));
        assert_eq!(k.get_chain_name_by_ibc_path(&path(1)), Some(osmosis.clone()));

        // same pair again is fine
        k.register_ibc_path(&osmosis, path(1)).unwrap();
        // path already taken by another chain
        assert!(matches!(
            k.register_ibc_path(&cosmoshub, path(1)),
            Err(Error::IbcPathTaken { .. })
        ));
        // chain already has a different path
        assert!(matches!(
            k.register_ibc_path(&osmosis, path(2)),
            Err(Error::IbcPathAlreadySet { .. })
        ));
        // unknown chain
        assert!(k
            .register_ibc_path(&ChainName::new("juno").unwrap(), path(3))
            .is_err());
    }

    #[test]
    fn chain_lookup_ignores_case() {
        let mut k = keeper();
        k.set_cosmos_chain(chain("Osmosis")).unwrap();
        assert!(k
            .get_cosmos_chain(&ChainName::new("OSMOSIS").unwrap())
            .is_some());
        assert_eq!(k.get_cosmos_chains().len(), 1);
    }

    #[test]
    fn seq_id_mapping_resolves_once() {
        let mut k = keeper();
        let seq = Sequence::from(4);
        k.set_seq_id_mapping(&path(0), seq, TransferId(9)).unwrap();

        assert_eq!(k.get_seq_id_mapping(&path(0), seq), Some(TransferId(9)));
        k.delete_seq_id_mapping(&path(0), seq);
        assert_eq!(k.get_seq_id_mapping(&path(0), seq), None);
        assert_eq!(k.get_seq_id_mapping(&path(1), seq), None);
    }

    #[test]
    fn seq_id_mappings_are_listed_in_key_order() {
        let mut k = keeper();
        k.set_seq_id_mapping(&path(0), Sequence::from(10), TransferId(2))
            .unwrap();
        k.set_seq_id_mapping(&path(0), Sequence::from(9), TransferId(1))
            .unwrap();

        let mappings = k.get_seq_id_mappings();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].sequence, Sequence::from(9));
        assert_eq!(mappings[0].id, TransferId(1));
        assert_eq!(mappings[1].path, path(0));
    }

    #[test]
    fn message_id_mapping_cannot_be_overwritten() {
        let mut k = keeper();
        let seq = Sequence::from(1);
        k.set_seq_message_id_mapping(&path(0), seq, "msg-1".to_owned())
            .unwrap();

        let err = k
            .set_seq_message_id_mapping(&path(0), seq, "msg-2".to_owned())
            .unwrap_err();
        assert!(err.to_string().contains("already set"));
        assert_eq!(
            k.get_seq_message_id_mapping(&path(0), seq),
            Some("msg-1".to_owned())
        );

        k.delete_seq_message_id_mapping(&path(0), seq);
        assert_eq!(k.get_seq_message_id_mapping(&path(0), seq), None);
    }

    #[test]
    fn transfer_status_changes_are_persisted() {
        let mut k = keeper();
        k.enqueue_ibc_transfer(transfer(1)).unwrap();

        k.set_transfer_failed(TransferId(1)).unwrap();
        assert_eq!(
            k.get_transfer(TransferId(1)).unwrap().status,
            TransferStatus::Failed
        );
        assert!(k.set_transfer_completed(TransferId(1)).is_err());
        k.set_transfer_pending(TransferId(1)).unwrap();
        k.set_transfer_completed(TransferId(1)).unwrap();

        assert!(matches!(
            k.set_transfer_failed(TransferId(2)),
            Err(Error::TransferNotFound { id: 2 })
        ));
        assert_eq!(k.get_transfers().len(), 1);
    }
}
