use std::collections::BTreeSet;
use std::fmt::Debug;

use axelarnet_store::context::SavepointStore;
use tracing::{error, info};

use super::context::{ChannelKeeper, IbcTransferKeeper, Nexus};
use super::error::Error;
use super::events::Event;
use super::impls::Axelarnet;
use super::msgs::AxelarnetMsg;
use super::nexus::{Chain, ChainName, CrossChainTransfer, TransferId, TransferState, MODULE_NAME};
use super::types::{ibc_account, CosmosChain, IbcPath, IbcTransfer, TransferStatus};
use crate::bank::BankKeeper;

impl<S, N, B, C, T> Axelarnet<S, N, B, C, T>
where
    S: SavepointStore + Debug,
    N: Nexus,
    B: BankKeeper,
    C: ChannelKeeper,
    T: IbcTransferKeeper,
{
    pub fn handle_msg(&mut self, msg: AxelarnetMsg) -> Result<(), Error> {
        match msg {
            AxelarnetMsg::RegisterIbcPath { chain, path } => {
                self.keeper.register_ibc_path(&chain, path)
            }
            AxelarnetMsg::AddCosmosBasedChain {
                name,
                addr_prefix,
                native_assets,
                ibc_path,
            } => self.atomically(|app| {
                app.add_cosmos_based_chain(name, addr_prefix, &native_assets, ibc_path)
            }),
            AxelarnetMsg::RouteIbcTransfers => self.route_ibc_transfers(),
            AxelarnetMsg::RetryIbcTransfer { chain, id } => {
                self.atomically(|app| app.retry_ibc_transfer(&chain, id))
            }
            AxelarnetMsg::RegisterAsset {
                chain,
                denom,
                is_native,
            } => self.register_asset(&chain, &denom, is_native),
            AxelarnetMsg::RouteMessage { id, ctx } => {
                self.atomically(|app| app.route_general_message(&id, &ctx))
            }
        }
    }

    /// Registers `denom` as an asset of a chain already known to the nexus registry.
    pub fn register_asset(
        &mut self,
        chain: &ChainName,
        denom: &str,
        is_native: bool,
    ) -> Result<(), Error> {
        let chain = self
            .nexus
            .get_chain(chain)
            .ok_or_else(|| Error::UnknownChain {
                chain: chain.to_string(),
            })?;
        self.nexus
            .register_asset(&chain, denom, is_native)
            .map_err(Error::nexus)?;

        info!("registered asset {} on {}", denom, chain.name);
        Ok(())
    }

    /// Registers a new cosmos chain with the nexus registry and binds it to `ibc_path`.
    ///
    /// Everything that can fail is checked before the registry is written to, since registry
    /// writes are not undone with the module store.
    pub fn add_cosmos_based_chain(
        &mut self,
        name: ChainName,
        addr_prefix: String,
        native_assets: &[String],
        ibc_path: IbcPath,
    ) -> Result<(), Error> {
        if self.nexus.get_chain(&name).is_some() || self.keeper.get_cosmos_chain(&name).is_some() {
            return Err(Error::ChainAlreadyRegistered {
                chain: name.to_string(),
            });
        }
        if let Some(owner) = self.keeper.get_chain_name_by_ibc_path(&ibc_path) {
            return Err(Error::IbcPathTaken {
                path: ibc_path.to_string(),
                chain: owner.to_string(),
            });
        }
        let mut seen = BTreeSet::new();
        if let Some(duplicate) = native_assets.iter().find(|asset| !seen.insert(*asset)) {
            return Err(Error::InvalidParams {
                reason: format!("native asset {duplicate} is listed twice"),
            });
        }

        self.keeper.set_cosmos_chain(CosmosChain {
            name: name.clone(),
            ibc_path: None,
            addr_prefix,
        })?;
        self.keeper.register_ibc_path(&name, ibc_path)?;

        let chain = Chain {
            name: name.clone(),
            module: MODULE_NAME.to_owned(),
            supports_foreign_assets: true,
        };
        self.nexus.set_chain(chain.clone());

        let hub = Chain::hub();
        for asset in native_assets {
            self.nexus
                .register_asset(&chain, asset, true)
                .map_err(Error::nexus)?;
            if !self.nexus.is_asset_registered(&hub, asset) {
                self.nexus
                    .register_asset(&hub, asset, false)
                    .map_err(Error::nexus)?;
            }
        }

        info!("added cosmos chain {}", name);
        Ok(())
    }

    /// Moves pending registry transfers destined to cosmos chains into the outbound queue.
    ///
    /// Transfers that cannot be routed are logged and stay pending in the registry.
    pub fn route_ibc_transfers(&mut self) -> Result<(), Error> {
        let limit = self.keeper.get_params().transfer_limit;

        for cosmos_chain in self.keeper.get_cosmos_chains() {
            // the hub has no path and receives nothing over IBC
            let Some(path) = cosmos_chain.ibc_path else {
                continue;
            };
            let chain = self
                .nexus
                .get_chain(&cosmos_chain.name)
                .ok_or_else(|| Error::UnknownChain {
                    chain: cosmos_chain.name.to_string(),
                })?;

            for transfer in self
                .nexus
                .get_transfers_for_chain(&chain, TransferState::Pending, limit)
            {
                if let Err(e) = self.atomically(|app| app.route_transfer(&transfer, &path)) {
                    error!("failed to route transfer {} to {}: {}", transfer.id, chain.name, e);
                }
            }
        }
        Ok(())
    }

    fn route_transfer(&mut self, transfer: &CrossChainTransfer, path: &IbcPath) -> Result<(), Error> {
        let coin = self.coin_from_registry(transfer.asset.clone())?;
        let sender = ibc_account();
        self.unlock_coin(&coin, sender.clone())?;

        self.keeper.enqueue_ibc_transfer(IbcTransfer::new(
            transfer.id,
            sender,
            transfer.recipient.address.clone(),
            coin.original_coin(),
            path.port_id.clone(),
            path.channel_id.clone(),
        ))?;
        self.nexus.archive_pending_transfer(transfer);

        info!(
            "routed transfer {} of {} to {}",
            transfer.id, transfer.asset, transfer.recipient
        );
        Ok(())
    }

    /// Re-sends a failed transfer over the path it was originally sent on.
    pub fn retry_ibc_transfer(&mut self, chain: &ChainName, id: TransferId) -> Result<(), Error> {
        let cosmos_chain =
            self.keeper
                .get_cosmos_chain(chain)
                .ok_or_else(|| Error::UnknownCosmosChain {
                    chain: chain.to_string(),
                })?;
        let path = cosmos_chain.ibc_path.ok_or_else(|| Error::IbcPathNotFound {
            chain: chain.to_string(),
        })?;

        let mut transfer = self
            .keeper
            .get_transfer(id)
            .ok_or(Error::TransferNotFound { id: id.0 })?;
        if transfer.status != TransferStatus::Failed {
            return Err(Error::InvalidTransfer {
                reason: format!(
                    "transfer {id} is {}, only failed transfers can be retried",
                    transfer.status
                ),
            });
        }
        if transfer.path() != path {
            return Err(Error::InvalidTransfer {
                reason: format!("transfer {id} was not sent to {chain} over {path}"),
            });
        }

        transfer.set_status(TransferStatus::Pending)?;
        self.keeper.set_transfer(transfer.clone())?;
        self.send_ibc_transfer(transfer.clone())?;

        info!("retried transfer {}", id);
        self.emit(Event::IbcTransferRetried {
            id,
            receiver: transfer.receiver,
            asset: transfer.token,
            path,
        });
        Ok(())
    }
}
