use std::fmt::Debug;

use axelarnet_store::context::SavepointStore;
use axelarnet_store::impls::SharedStore;
use cosmrs::AccountId;
use ibc_proto::google::protobuf::Any;
use tendermint::abci::Event as AbciEvent;
use tracing::{debug, info};

use super::context::{ChannelKeeper, IbcTransferKeeper, Nexus};
use super::error::Error;
use super::events::Event;
use super::genesis::GenesisState;
use super::keeper::Keeper;
use super::msgs::AxelarnetMsg;
use crate::bank::BankKeeper;
use crate::context::Module;
use crate::error::Error as AppError;

/// The gateway module: owns its keeper state and drives the nexus, bank, channel and transfer
/// collaborators.
pub struct Axelarnet<S, N, B, C, T> {
    pub(super) keeper: Keeper<S>,
    pub(super) nexus: N,
    pub(super) bank: B,
    pub(super) channel: C,
    pub(super) transfer: T,
    pub(super) events: Vec<Event>,
}

impl<S, N, B, C, T> Axelarnet<S, N, B, C, T>
where
    S: SavepointStore + Debug,
    N: Nexus,
    B: BankKeeper,
    C: ChannelKeeper,
    T: IbcTransferKeeper,
{
    pub fn new(store: SharedStore<S>, nexus: N, bank: B, channel: C, transfer: T) -> Self {
        Self {
            keeper: Keeper::new(store),
            nexus,
            bank,
            channel,
            transfer,
            events: vec![],
        }
    }

    pub fn keeper(&self) -> &Keeper<S> {
        &self.keeper
    }

    pub fn keeper_mut(&mut self) -> &mut Keeper<S> {
        &mut self.keeper
    }

    pub fn nexus(&self) -> &N {
        &self.nexus
    }

    pub fn nexus_mut(&mut self) -> &mut N {
        &mut self.nexus
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    /// Drains the events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub(super) fn emit(&mut self, event: Event) {
        debug!("emitting event {}", event.name());
        self.events.push(event);
    }

    /// Runs `f` behind a store savepoint. On error the writes made by `f` are undone and the
    /// events it emitted are dropped; earlier writes stay pending for the host to commit or
    /// discard.
    ///
    /// Only the module store is rolled back. Collaborators that keep state elsewhere are
    /// expected to fail before they write.
    pub(super) fn atomically<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let savepoint = self.keeper.store().savepoint();
        let events = self.events.len();

        let result = f(self);
        if result.is_err() {
            self.keeper.store_mut().rollback_to(savepoint);
            self.events.truncate(events);
        }
        result
    }

    fn take_abci_events(&mut self) -> Vec<AbciEvent> {
        self.take_events().into_iter().map(Into::into).collect()
    }
}

impl<S, N, B, C, T> Module for Axelarnet<S, N, B, C, T>
where
    S: SavepointStore + Debug,
    N: Nexus + Send + Sync,
    B: BankKeeper + Send + Sync,
    C: ChannelKeeper + Send + Sync,
    T: IbcTransferKeeper + Send + Sync,
{
    type Store = S;

    fn deliver(&mut self, message: Any, signer: &AccountId) -> Result<Vec<AbciEvent>, AppError> {
        let msg = AxelarnetMsg::try_from(message)?;
        debug!("delivering {:?} signed by {}", msg, signer);

        // failed messages leave no events behind
        let result = self.handle_msg(msg);
        let events = self.take_abci_events();
        result.map(|_| events).map_err(Into::into)
    }

    fn init(&mut self, app_state: serde_json::Value) {
        let genesis: GenesisState = match app_state.get("axelarnet") {
            Some(state) => serde_json::from_value(state.clone()).unwrap_or_else(|e| {
                panic!("failed to decode axelarnet genesis state: {e}");
            }),
            None => GenesisState::default(),
        };
        self.init_genesis(genesis);
        info!("initialized axelarnet module from genesis");
    }

    fn end_block(&mut self) -> Vec<AbciEvent> {
        self.end_blocker();
        self.take_abci_events()
    }

    fn store_mut(&mut self) -> &mut SharedStore<S> {
        self.keeper.store_mut()
    }

    fn store(&self) -> &SharedStore<S> {
        self.keeper.store()
    }
}
