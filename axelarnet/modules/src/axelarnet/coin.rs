use std::fmt::Debug;

use axelarnet_store::context::SavepointStore;
use cosmrs::AccountId;
use ibc::apps::transfer::types::TracePrefix;
use primitive_types::U256;
use tracing::trace;

use super::context::{ChannelKeeper, IbcTransferKeeper, Nexus};
use super::denom::{parse_denom, parse_ibc_denom_hash, DenomTrace, VoucherDenom};
use super::error::Error;
use super::impls::Axelarnet;
use super::nexus::Chain;
use super::types::{escrow_address, module_account};
use crate::bank::{BankKeeper, Coin};

/// How a token is held by the hub, which decides how it is locked and released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoinType {
    /// An ICS-20 voucher of an asset native to a cosmos chain
    Ics20,
    /// An asset native to the hub
    Native,
    /// An asset registered on the hub but native elsewhere (minted and burned by the module)
    External,
    Unrecognized,
}

/// A coin classified against the registry.
///
/// `coin` carries the registry denom: ICS-20 vouchers are normalized to their base denom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockableCoin {
    pub coin: Coin,
    pub coin_type: CoinType,
    trace: Option<DenomTrace>,
}

impl LockableCoin {
    pub fn denom(&self) -> &str {
        self.coin.denom.as_str()
    }

    pub fn amount(&self) -> U256 {
        self.coin.amount
    }

    /// The coin as it exists in the bank, i.e. with its `ibc/<hash>` denom for ICS-20 tokens.
    pub fn original_coin(&self) -> Coin {
        match &self.trace {
            Some(trace) => Coin::new(trace.ibc_denom(), self.coin.amount),
            None => self.coin.clone(),
        }
    }

    pub fn ensure_recognized(self) -> Result<Self, Error> {
        match self.coin_type {
            CoinType::Unrecognized => Err(Error::UnrecognizedToken {
                denom: self.coin.denom.to_string(),
            }),
            _ => Ok(self),
        }
    }

    /// Returns a copy holding `amount` less. Callers check `amount` does not exceed the held
    /// amount.
    pub fn sub(&self, amount: U256) -> Self {
        Self {
            coin: Coin {
                denom: self.coin.denom.clone(),
                amount: self.coin.amount.saturating_sub(amount),
            },
            coin_type: self.coin_type,
            trace: self.trace.clone(),
        }
    }
}

fn is_native_on_hub<N: Nexus>(nexus: &N, denom: &str) -> bool {
    nexus
        .get_chain_by_native_asset(denom)
        .map_or(false, |chain| chain.is_hub())
}

impl<S, N, B, C, T> Axelarnet<S, N, B, C, T>
where
    S: SavepointStore + Debug,
    N: Nexus,
    B: BankKeeper,
    C: ChannelKeeper,
    T: IbcTransferKeeper,
{
    /// Classifies a bank coin. Unrecognized tokens are returned as such; only `lock` and
    /// `unlock` reject them.
    pub fn new_coin(&self, coin: Coin) -> Result<LockableCoin, Error> {
        let denom = coin.denom.as_str();

        if let Some(hash) = parse_ibc_denom_hash(denom) {
            let trace = self
                .transfer
                .get_denom_trace(&hash)
                .ok_or_else(|| Error::DenomTraceNotFound {
                    denom: denom.to_owned(),
                })?;
            return Ok(LockableCoin {
                coin: Coin::new(trace.base_denom.to_string(), coin.amount),
                coin_type: CoinType::Ics20,
                trace: Some(trace),
            });
        }

        let coin_type = if is_native_on_hub(&self.nexus, denom) {
            CoinType::Native
        } else if self.nexus.is_asset_registered(&Chain::hub(), denom) {
            CoinType::External
        } else {
            CoinType::Unrecognized
        };
        trace!("classified {} as {:?}", denom, coin_type);

        Ok(LockableCoin {
            coin,
            coin_type,
            trace: None,
        })
    }

    /// Builds the hub-side coin for a registry asset: assets native to a connected cosmos
    /// chain are held as ICS-20 vouchers over that chain's path.
    pub fn coin_from_registry(&self, asset: Coin) -> Result<LockableCoin, Error> {
        let cosmos_origin = self
            .nexus
            .get_chain_by_native_asset(asset.denom.as_str())
            .filter(|chain| !chain.is_hub())
            .and_then(|chain| self.keeper.get_ibc_path(&chain.name));

        match cosmos_origin {
            Some(path) => {
                let mut trace = parse_denom(asset.denom.as_str())?;
                trace.add_trace_prefix(TracePrefix::new(path.port_id, path.channel_id));
                Ok(LockableCoin {
                    coin: asset,
                    coin_type: CoinType::Ics20,
                    trace: Some(trace),
                })
            }
            None => self.new_coin(asset),
        }
    }

    /// Moves `coin` out of `from` into hub custody.
    pub fn lock_coin(&mut self, coin: &LockableCoin, from: AccountId) -> Result<(), Error> {
        match coin.coin_type {
            CoinType::Ics20 => {
                self.ensure_registered_path(coin)?;
                let ics20 = coin.original_coin();
                let escrow = escrow_address(ics20.denom.as_str());
                self.bank
                    .send_coins(from, escrow, [ics20])
                    .map_err(Error::bank)
            }
            CoinType::Native => {
                let escrow = escrow_address(coin.denom());
                self.bank
                    .send_coins(from, escrow, [coin.coin.clone()])
                    .map_err(Error::bank)
            }
            CoinType::External => {
                self.bank
                    .send_coins(from, module_account(), [coin.coin.clone()])
                    .map_err(Error::bank)?;
                if let Err(e) = self.bank.burn_coins(module_account(), [coin.coin.clone()]) {
                    panic!("burning {} from the module account failed after funding it: {e}", coin.coin);
                }
                Ok(())
            }
            CoinType::Unrecognized => Err(Error::UnrecognizedToken {
                denom: coin.denom().to_owned(),
            }),
        }
    }

    /// Releases `coin` from hub custody to `to`.
    pub fn unlock_coin(&mut self, coin: &LockableCoin, to: AccountId) -> Result<(), Error> {
        match coin.coin_type {
            CoinType::Ics20 => {
                self.ensure_registered_path(coin)?;
                let ics20 = coin.original_coin();
                let escrow = escrow_address(ics20.denom.as_str());
                self.bank
                    .send_coins(escrow, to, [ics20])
                    .map_err(Error::bank)
            }
            CoinType::Native => {
                let escrow = escrow_address(coin.denom());
                self.bank
                    .send_coins(escrow, to, [coin.coin.clone()])
                    .map_err(Error::bank)
            }
            CoinType::External => {
                if let Err(e) = self.bank.mint_coins(module_account(), [coin.coin.clone()]) {
                    panic!("minting {} into the module account failed: {e}", coin.coin);
                }
                if let Err(e) = self.bank.send_coins(module_account(), to, [coin.coin.clone()]) {
                    panic!("sending freshly minted {} failed: {e}", coin.coin);
                }
                Ok(())
            }
            CoinType::Unrecognized => Err(Error::UnrecognizedToken {
                denom: coin.denom().to_owned(),
            }),
        }
    }

    /// Checks that an ICS-20 coin travelled over the path registered for the chain its base
    /// denom is native to.
    pub(super) fn ensure_registered_path(&self, coin: &LockableCoin) -> Result<(), Error> {
        let trace = coin.trace.as_ref().ok_or_else(|| Error::DenomTraceNotFound {
            denom: coin.denom().to_owned(),
        })?;
        let chain = self
            .nexus
            .get_chain_by_native_asset(trace.base_denom.as_str())
            .ok_or_else(|| Error::AssetNotLinked {
                denom: trace.base_denom.to_string(),
            })?;
        let registered = self
            .keeper
            .get_ibc_path(&chain.name)
            .ok_or_else(|| Error::IbcPathNotFound {
                chain: chain.name.to_string(),
            })?;

        let trace_path = trace.trace_path.to_string();
        if trace_path != registered.to_string() {
            return Err(Error::PathMismatch {
                denom: trace.base_denom.to_string(),
                trace_path,
                registered: registered.to_string(),
            });
        }
        Ok(())
    }
}

impl From<LockableCoin> for Coin {
    fn from(coin: LockableCoin) -> Self {
        coin.coin
    }
}
