use std::fmt::Debug;

use axelarnet_store::context::SavepointStore;
use primitive_types::U256;
use tracing::debug;

use super::coin::CoinType;
use super::context::{ChannelKeeper, IbcTransferKeeper, Nexus};
use super::denom::{parse_denom, receiving_denom, VoucherDenom};
use super::error::Error;
use super::impls::Axelarnet;
use super::nexus::TransferDirection;
use super::packet::{decode_packet_data, Packet, PacketPaths};
use super::types::IbcPath;
use crate::bank::{BankKeeper, Coin};

/// Parses an ICS-20 amount, which must be a strictly positive decimal integer.
pub(super) fn parse_positive_amount(amount: &str) -> Result<U256, Error> {
    let invalid = || Error::InvalidAmount {
        amount: amount.to_owned(),
    };

    let (negative, digits) = match amount.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, amount),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let parsed = U256::from_dec_str(digits).map_err(|_| invalid())?;
    if negative || parsed.is_zero() {
        return Err(Error::NonPositiveAmount {
            amount: amount.to_owned(),
        });
    }
    Ok(parsed)
}

impl<S, N, B, C, T> Axelarnet<S, N, B, C, T>
where
    S: SavepointStore + Debug,
    N: Nexus,
    B: BankKeeper,
    C: ChannelKeeper,
    T: IbcTransferKeeper,
{
    /// Accounts an ICS-20 packet crossing `ibc_path` against the rate limit of the chain
    /// registered for that path.
    ///
    /// Packets on unregistered paths, carrying unrecognized tokens, or carrying vouchers that
    /// did not come over the path registered for their asset are not limited.
    pub fn rate_limit_packet(
        &mut self,
        packet: &Packet,
        direction: TransferDirection,
        ibc_path: &IbcPath,
    ) -> Result<(), Error> {
        let Some(chain_name) = self.keeper.get_chain_name_by_ibc_path(ibc_path) else {
            return Ok(());
        };
        let chain = self
            .nexus
            .get_chain(&chain_name)
            .ok_or_else(|| Error::UnknownChain {
                chain: chain_name.to_string(),
            })?;
        if !self.nexus.is_chain_activated(&chain) {
            return Err(Error::ChainDeactivated {
                chain: chain.name.to_string(),
                path: ibc_path.to_string(),
            });
        }

        let data = decode_packet_data(&packet.data)?;
        let amount = parse_positive_amount(&data.amount)?;

        // the denom as it is (or will be) held on the hub
        let hub_denom = if ibc_path == &packet.destination_path() {
            receiving_denom(
                (&packet.port_id_on_a, &packet.chan_id_on_a),
                (&packet.port_id_on_b, &packet.chan_id_on_b),
                &data.denom,
            )?
        } else {
            parse_denom(&data.denom)?.ibc_denom()
        };

        let coin = match self.new_coin(Coin::new(hub_denom.clone(), amount)) {
            Ok(coin) => coin,
            Err(Error::DenomTraceNotFound { .. }) => {
                debug!("no trace for {}, skipping rate limit", hub_denom);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        match coin.coin_type {
            CoinType::Unrecognized => {
                debug!("unrecognized token {}, skipping rate limit", hub_denom);
                return Ok(());
            }
            CoinType::Ics20 if self.ensure_registered_path(&coin).is_err() => {
                debug!(
                    "{} did not come over its registered path, skipping rate limit",
                    hub_denom
                );
                return Ok(());
            }
            _ => {}
        }

        debug!(
            "rate limiting {} {:?} on chain {}",
            coin.coin, direction, chain.name
        );
        self.nexus
            .rate_limit_transfer(&chain.name, &coin.coin, direction)
            .map_err(Error::nexus)
    }

    /// Sends a packet through the channel, then rate limits it as outgoing unless it carries a
    /// routed transfer, which the registry has already accounted for.
    pub fn send_packet(&mut self, packet: &Packet) -> Result<(), Error> {
        self.channel.send_packet(packet).map_err(Error::channel)?;

        let path = packet.source_path();
        if self
            .keeper
            .get_seq_id_mapping(&path, packet.seq_on_a)
            .is_some()
        {
            return Ok(());
        }

        self.rate_limit_packet(packet, TransferDirection::Outgoing, &path)
    }
}
