use std::fmt::Debug;
use std::str::FromStr;

use axelarnet_store::context::SavepointStore;
use cosmrs::AccountId;
use ibc::core::channel::types::acknowledgement::AcknowledgementStatus;
use ibc_proto::ibc::applications::transfer::v2::FungibleTokenPacketData;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tiny_keccak::{Hasher, Keccak};
use tracing::debug;

use super::coin::LockableCoin;
use super::context::{ChannelKeeper, IbcTransferKeeper, Nexus};
use super::denom::receiving_denom;
use super::error::Error;
use super::events::Event;
use super::impls::Axelarnet;
use super::nexus::{
    Chain, ChainName, CrossChainAddress, GeneralMessage, TransferDirection, EVM_MODULE,
};
use super::packet::{
    decode_packet_data, error_acknowledgement, success_acknowledgement, Packet, PacketPaths,
};
use super::queue::base64_bytes;
use super::rate_limit::parse_positive_amount;
use super::types::{gmp_account, HUB_ADDRESS_PREFIX};
use crate::bank::{BankKeeper, Coin};

/// Relayer fee attached to a general message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub amount: String,
    pub recipient: String,
}

/// The general message instruction carried in an ICS-20 memo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub destination_chain: String,
    pub destination_address: String,
    #[serde(default, with = "base64_bytes")]
    pub payload: Vec<u8>,
    /// A missing type decodes as `0`, a pure general message
    #[serde(default, rename = "type")]
    pub kind: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Fee>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageType {
    /// A contract call without tokens
    GeneralMessage,
    /// A contract call carrying the packet's tokens
    GeneralMessageWithToken,
    /// A plain cross-chain token transfer
    SendToken,
}

impl TryFrom<i64> for MessageType {
    type Error = Error;

    fn try_from(kind: i64) -> Result<Self, Self::Error> {
        match kind {
            0 => Ok(Self::GeneralMessage),
            1 => Ok(Self::GeneralMessageWithToken),
            2 => Ok(Self::SendToken),
            _ => Err(Error::UnrecognizedMessageType { kind }),
        }
    }
}

pub(super) fn keccak256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(bytes);
    hasher.finalize(&mut output);
    output
}

/// The parts of a general message that passed validation.
struct Validated {
    kind: MessageType,
    source: CrossChainAddress,
    recipient: CrossChainAddress,
}

impl<S, N, B, C, T> Axelarnet<S, N, B, C, T>
where
    S: SavepointStore + Debug,
    N: Nexus,
    B: BankKeeper,
    C: ChannelKeeper,
    T: IbcTransferKeeper,
{
    /// Handles an ICS-20 packet already credited by the transfer application.
    ///
    /// Packets sent to the GMP account carry a general message in their memo, which is
    /// validated and submitted to the registry; all other packets are plain transfers and only
    /// rate limited. Never fails: errors become error acknowledgements.
    pub fn on_recv_message(&mut self, packet: &Packet) -> AcknowledgementStatus {
        let data = match decode_packet_data(&packet.data) {
            Ok(data) => data,
            Err(e) => return error_acknowledgement(e),
        };
        let path = packet.destination_path();

        if data.receiver != gmp_account().to_string() {
            return match self.rate_limit_packet(packet, TransferDirection::Incoming, &path) {
                Ok(()) => success_acknowledgement(),
                Err(e) => error_acknowledgement(e),
            };
        }

        let handled = self.atomically(|app| app.handle_general_message(packet, &data));
        let rate_limit = match handled {
            Ok(rate_limit) => rate_limit,
            Err(e) => {
                debug!(
                    "failed handling general message from {}/{} with sequence {}: {}",
                    packet.port_id_on_a, packet.chan_id_on_a, packet.seq_on_a, e
                );
                return error_acknowledgement(e);
            }
        };

        // the message is already submitted at this point; a rate limit failure still fails
        // the acknowledgement
        if rate_limit {
            if let Err(e) = self.rate_limit_packet(packet, TransferDirection::Incoming, &path) {
                return error_acknowledgement(e);
            }
        }
        success_acknowledgement()
    }

    /// Returns whether the packet still needs to be rate limited.
    fn handle_general_message(
        &mut self,
        packet: &Packet,
        data: &FungibleTokenPacketData,
    ) -> Result<bool, Error> {
        let msg: Message =
            serde_json::from_str(&data.memo).map_err(|_| Error::GeneralMessage {
                reason: "cannot unmarshal memo".to_owned(),
            })?;
        let token = self.extract_token(packet, data)?;
        let Validated {
            kind,
            source,
            recipient,
        } = self.validate_message(packet, &msg, data, &token)?;

        match kind {
            MessageType::GeneralMessage => {
                self.handle_message(source, recipient, &msg, &token)?;
                Ok(true)
            }
            MessageType::GeneralMessageWithToken => {
                self.handle_message_with_token(source, recipient, &msg, &token)?;
                Ok(true)
            }
            // the registry rate limits the transfer it enqueues
            MessageType::SendToken => {
                self.handle_token_sent(source, recipient, &token)?;
                Ok(false)
            }
        }
    }

    /// The packet's tokens as they were credited to the GMP account, classified.
    fn extract_token(
        &self,
        packet: &Packet,
        data: &FungibleTokenPacketData,
    ) -> Result<LockableCoin, Error> {
        let amount = parse_positive_amount(&data.amount)?;
        let denom = receiving_denom(
            (&packet.port_id_on_a, &packet.chan_id_on_a),
            (&packet.port_id_on_b, &packet.chan_id_on_b),
            &data.denom,
        )?;
        self.new_coin(Coin::new(denom, amount))?.ensure_recognized()
    }

    fn validate_message(
        &self,
        packet: &Packet,
        msg: &Message,
        data: &FungibleTokenPacketData,
        token: &LockableCoin,
    ) -> Result<Validated, Error> {
        let path = packet.destination_path();
        let source_name = self
            .keeper
            .get_chain_name_by_ibc_path(&path)
            .ok_or_else(|| Error::UnknownIbcPath {
                path: path.to_string(),
            })?;
        let source_chain = self.activated_chain(&source_name).map_err(|e| match e {
            Error::ChainNotActivated { chain } => Error::ChainDeactivated {
                chain,
                path: path.to_string(),
            },
            e => e,
        })?;

        let dest_name = ChainName::new(msg.destination_chain.as_str())?;
        let dest_chain = self.activated_chain(&dest_name)?;

        let recipient = CrossChainAddress {
            chain: dest_chain.clone(),
            address: msg.destination_address.clone(),
        };
        self.nexus
            .validate_address(&recipient)
            .map_err(Error::nexus)?;

        let kind = MessageType::try_from(msg.kind)?;
        if kind != MessageType::SendToken && !dest_chain.is_from(EVM_MODULE) {
            return Err(Error::NonEvmDestination {
                chain: dest_chain.name.to_string(),
            });
        }

        if let Some(fee) = &msg.fee {
            self.validate_fee(fee, kind, token)?;
        }

        if kind != MessageType::GeneralMessage {
            for chain in [&source_chain, &dest_chain] {
                if !self.nexus.is_asset_registered(chain, token.denom()) {
                    return Err(Error::AssetNotRegistered {
                        denom: token.denom().to_owned(),
                        chain: chain.name.to_string(),
                    });
                }
            }
        }

        Ok(Validated {
            kind,
            source: CrossChainAddress {
                chain: source_chain,
                address: data.sender.clone(),
            },
            recipient,
        })
    }

    fn activated_chain(&self, name: &ChainName) -> Result<Chain, Error> {
        let chain = self
            .nexus
            .get_chain(name)
            .ok_or_else(|| Error::UnknownChain {
                chain: name.to_string(),
            })?;
        if !self.nexus.is_chain_activated(&chain) {
            return Err(Error::ChainNotActivated {
                chain: chain.name.to_string(),
            });
        }
        Ok(chain)
    }

    fn validate_fee(&self, fee: &Fee, kind: MessageType, token: &LockableCoin) -> Result<(), Error> {
        let invalid = |reason: String| Error::InvalidFee { reason };

        let amount = parse_positive_amount(&fee.amount).map_err(|e| invalid(e.to_string()))?;
        match kind {
            MessageType::SendToken => {
                return Err(invalid("fees are not supported for token transfers".to_owned()))
            }
            MessageType::GeneralMessageWithToken if amount >= token.amount() => {
                return Err(invalid(format!(
                    "fee {amount} must be less than the transferred amount {}",
                    token.amount()
                )))
            }
            MessageType::GeneralMessage if amount > token.amount() => {
                return Err(invalid(format!(
                    "fee {amount} exceeds the transferred amount {}",
                    token.amount()
                )))
            }
            _ => {}
        }

        if !self.nexus.is_asset_registered(&Chain::hub(), token.denom()) {
            return Err(invalid(format!(
                "fee denom {} is not registered on the hub",
                token.denom()
            )));
        }

        let recipient = parse_hub_address(&fee.recipient)?;
        if self.bank.blocked_addr(&recipient) {
            return Err(invalid(format!("fee recipient {recipient} is blocked")));
        }
        Ok(())
    }

    /// Pays the relayer fee out of the GMP account. Returns the amount charged.
    fn charge_fee(
        &mut self,
        message_id: &str,
        fee: Option<&Fee>,
        token: &LockableCoin,
    ) -> Result<U256, Error> {
        let Some(fee) = fee else {
            return Ok(U256::zero());
        };

        let amount = parse_positive_amount(&fee.amount)?;
        let recipient = parse_hub_address(&fee.recipient)?;
        let paid = Coin::new(token.original_coin().denom.to_string(), amount);
        self.bank
            .send_coins(gmp_account(), recipient.clone(), [paid])
            .map_err(Error::bank)?;

        self.emit(Event::FeePaid {
            message_id: message_id.to_owned(),
            recipient: recipient.to_string(),
            fee: Coin::new(token.denom(), amount),
        });
        Ok(amount)
    }

    fn handle_message(
        &mut self,
        source: CrossChainAddress,
        recipient: CrossChainAddress,
        msg: &Message,
        token: &LockableCoin,
    ) -> Result<(), Error> {
        let (id, tx_id, index) = self.nexus.generate_message_id();
        self.charge_fee(&id, msg.fee.as_ref(), token)?;

        let message = GeneralMessage::new(
            id,
            source,
            recipient,
            keccak256(&msg.payload),
            (tx_id, index),
            None,
        );
        self.emit(Event::ContractCallSubmitted {
            message_id: message.id.clone(),
            sender: message.sender.address.clone(),
            source_chain: message.sender.chain.name.clone(),
            destination_chain: message.recipient.chain.name.clone(),
            contract_address: message.recipient.address.clone(),
            payload: msg.payload.clone(),
            payload_hash: message.payload_hash,
        });
        self.nexus.set_new_message(message).map_err(Error::nexus)
    }

    fn handle_message_with_token(
        &mut self,
        source: CrossChainAddress,
        recipient: CrossChainAddress,
        msg: &Message,
        token: &LockableCoin,
    ) -> Result<(), Error> {
        let (id, tx_id, index) = self.nexus.generate_message_id();
        let fee = self.charge_fee(&id, msg.fee.as_ref(), token)?;

        let asset = token.sub(fee);
        self.lock_coin(&asset, gmp_account())?;

        let message = GeneralMessage::new(
            id,
            source,
            recipient,
            keccak256(&msg.payload),
            (tx_id, index),
            Some(asset.coin.clone()),
        );
        self.emit(Event::ContractCallWithTokenSubmitted {
            message_id: message.id.clone(),
            sender: message.sender.address.clone(),
            source_chain: message.sender.chain.name.clone(),
            destination_chain: message.recipient.chain.name.clone(),
            contract_address: message.recipient.address.clone(),
            payload: msg.payload.clone(),
            payload_hash: message.payload_hash,
            asset: asset.coin,
        });
        self.nexus.set_new_message(message).map_err(Error::nexus)
    }

    fn handle_token_sent(
        &mut self,
        source: CrossChainAddress,
        recipient: CrossChainAddress,
        token: &LockableCoin,
    ) -> Result<(), Error> {
        self.lock_coin(token, gmp_account())?;

        let transfer_id = self
            .nexus
            .enqueue_transfer(&source.chain, recipient.clone(), token.coin.clone())
            .map_err(Error::nexus)?;

        self.emit(Event::TokenSent {
            transfer_id,
            sender: source.address,
            source_chain: source.chain.name,
            destination_chain: recipient.chain.name,
            destination_address: recipient.address,
            asset: token.coin.clone(),
        });
        Ok(())
    }
}

fn parse_hub_address(address: &str) -> Result<AccountId, Error> {
    let invalid = |reason: String| Error::InvalidAddress {
        address: address.to_owned(),
        reason,
    };
    let account = AccountId::from_str(address).map_err(|e| invalid(e.to_string()))?;
    if account.prefix() != HUB_ADDRESS_PREFIX {
        return Err(invalid(format!(
            "expected prefix {HUB_ADDRESS_PREFIX}, got {}",
            account.prefix()
        )));
    }
    Ok(account)
}
