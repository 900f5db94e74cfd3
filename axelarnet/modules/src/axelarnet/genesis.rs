use std::collections::BTreeSet;
use std::fmt::Debug;

use axelarnet_store::context::SavepointStore;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::context::{ChannelKeeper, IbcTransferKeeper, Nexus};
use super::error::Error;
use super::impls::Axelarnet;
use super::keeper::SeqIdMapping;
use super::nexus::{ChainName, HUB_CHAIN_NAME};
use super::queue::{QueueState, ROUTE_TRANSFER_QUEUE_NAME};
use super::types::{CosmosChain, IbcTransfer, Params, HUB_ADDRESS_PREFIX};
use crate::bank::BankKeeper;

/// The module's genesis state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisState {
    pub params: Params,
    pub chains: Vec<CosmosChain>,
    pub transfer_queue: QueueState,
    pub ibc_transfers: Vec<IbcTransfer>,
    pub seq_id_mapping: Vec<SeqIdMapping>,
}

impl Default for GenesisState {
    fn default() -> Self {
        Self {
            params: Params::default(),
            chains: vec![CosmosChain {
                name: ChainName::new(HUB_CHAIN_NAME).unwrap(), // safety - static valid name
                ibc_path: None,
                addr_prefix: HUB_ADDRESS_PREFIX.to_owned(),
            }],
            transfer_queue: QueueState::default(),
            ibc_transfers: vec![],
            seq_id_mapping: vec![],
        }
    }
}

fn invalid(reason: impl ToString) -> Error {
    Error::InvalidGenesis {
        reason: reason.to_string(),
    }
}

impl GenesisState {
    pub fn validate(&self) -> Result<(), Error> {
        self.params.validate().map_err(invalid)?;

        let mut names = BTreeSet::new();
        let mut paths = BTreeSet::new();
        for chain in &self.chains {
            chain.validate_basic()?;
            if !names.insert(chain.name.to_key()) {
                return Err(invalid(format!("duplicate chain {}", chain.name)));
            }
            if let Some(path) = &chain.ibc_path {
                if !paths.insert(path.to_string()) {
                    return Err(invalid(format!("duplicate IBC path {path}")));
                }
            }
        }

        if self.transfer_queue.name != ROUTE_TRANSFER_QUEUE_NAME {
            return Err(invalid(format!(
                "unexpected transfer queue {}",
                self.transfer_queue.name
            )));
        }
        self.transfer_queue.validate().map_err(invalid)?;

        let mut ids = BTreeSet::new();
        for transfer in &self.ibc_transfers {
            transfer.validate_basic().map_err(invalid)?;
            if !ids.insert(transfer.id) {
                return Err(invalid(format!("duplicate transfer {}", transfer.id)));
            }
        }

        for queued in self.transfer_queue.transfers().map_err(invalid)? {
            if !ids.contains(&queued.id) {
                return Err(invalid(format!(
                    "queued transfer {} has no transfer record",
                    queued.id
                )));
            }
        }

        let mut keys = BTreeSet::new();
        for mapping in &self.seq_id_mapping {
            if !keys.insert((mapping.path.to_string(), u64::from(mapping.sequence))) {
                return Err(invalid(format!(
                    "duplicate sequence mapping {}/{}",
                    mapping.path, mapping.sequence
                )));
            }
            if !ids.contains(&mapping.id) {
                return Err(invalid(format!(
                    "sequence mapping {}/{} refers to unknown transfer {}",
                    mapping.path, mapping.sequence, mapping.id
                )));
            }
        }

        Ok(())
    }
}

impl<S, N, B, C, T> Axelarnet<S, N, B, C, T>
where
    S: SavepointStore + Debug,
    N: Nexus,
    B: BankKeeper,
    C: ChannelKeeper,
    T: IbcTransferKeeper,
{
    /// Loads `genesis` into the store.
    ///
    /// # Panics
    ///
    /// Panics if the state is invalid; a chain cannot start from corrupt state.
    pub fn init_genesis(&mut self, genesis: GenesisState) {
        if let Err(e) = genesis.validate().and_then(|_| self.import_genesis(genesis)) {
            panic!("failed to initialize axelarnet genesis state: {e}");
        }
    }

    fn import_genesis(&mut self, genesis: GenesisState) -> Result<(), Error> {
        self.keeper.set_params(genesis.params)?;

        for chain in genesis.chains {
            let path = chain.ibc_path.clone();
            let name = chain.name.clone();
            self.keeper.set_cosmos_chain(CosmosChain {
                ibc_path: None,
                ..chain
            })?;
            if let Some(path) = path {
                self.keeper.register_ibc_path(&name, path)?;
            }
        }

        for transfer in genesis.ibc_transfers {
            self.keeper.set_transfer(transfer)?;
        }
        self.keeper
            .transfer_queue()
            .import_state(&genesis.transfer_queue)?;

        for mapping in genesis.seq_id_mapping {
            self.keeper
                .set_seq_id_mapping(&mapping.path, mapping.sequence, mapping.id)?;
        }

        info!(
            "imported {} queued transfers",
            self.keeper.transfer_queue().len()
        );
        Ok(())
    }

    pub fn export_genesis(&self) -> GenesisState {
        GenesisState {
            params: self.keeper.get_params(),
            chains: self.keeper.get_cosmos_chains(),
            transfer_queue: self.keeper.transfer_queue().export_state(),
            ibc_transfers: self.keeper.get_transfers(),
            seq_id_mapping: self.keeper.get_seq_id_mappings(),
        }
    }
}
