//! Typed events emitted by the gateway.

use tendermint::abci::Event as AbciEvent;

use super::nexus::{ChainName, TransferId};
use super::types::IbcPath;
use crate::bank::Coin;

const EVENT_TYPE_PREFIX: &str = "axelar.axelarnet.v1beta1";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    IbcTransferSent {
        id: TransferId,
        receiver: String,
        asset: Coin,
        sequence: u64,
        path: IbcPath,
    },
    IbcTransferCompleted {
        id: TransferId,
        sequence: u64,
        path: IbcPath,
    },
    IbcTransferFailed {
        id: TransferId,
        sequence: u64,
        path: IbcPath,
    },
    IbcTransferRetried {
        id: TransferId,
        receiver: String,
        asset: Coin,
        path: IbcPath,
    },
    FeePaid {
        message_id: String,
        recipient: String,
        fee: Coin,
    },
    ContractCallSubmitted {
        message_id: String,
        sender: String,
        source_chain: ChainName,
        destination_chain: ChainName,
        contract_address: String,
        payload: Vec<u8>,
        payload_hash: [u8; 32],
    },
    ContractCallWithTokenSubmitted {
        message_id: String,
        sender: String,
        source_chain: ChainName,
        destination_chain: ChainName,
        contract_address: String,
        payload: Vec<u8>,
        payload_hash: [u8; 32],
        asset: Coin,
    },
    TokenSent {
        transfer_id: TransferId,
        sender: String,
        source_chain: ChainName,
        destination_chain: ChainName,
        destination_address: String,
        asset: Coin,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::IbcTransferSent { .. } => "IBCTransferSent",
            Self::IbcTransferCompleted { .. } => "IBCTransferCompleted",
            Self::IbcTransferFailed { .. } => "IBCTransferFailed",
            Self::IbcTransferRetried { .. } => "IBCTransferRetried",
            Self::FeePaid { .. } => "FeePaid",
            Self::ContractCallSubmitted { .. } => "ContractCallSubmitted",
            Self::ContractCallWithTokenSubmitted { .. } => "ContractCallWithTokenSubmitted",
            Self::TokenSent { .. } => "TokenSent",
        }
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        // attribute values are JSON encoded, as the cosmos typed event emitter does
        let json = |s: &str| serde_json::Value::from(s).to_string();

        match self {
            Self::IbcTransferSent {
                id,
                receiver,
                asset,
                sequence,
                path,
            } => vec![
                ("id", json(&id.to_string())),
                ("recipient", json(receiver)),
                ("asset", json(&asset.to_string())),
                ("sequence", json(&sequence.to_string())),
                ("port_id", json(path.port_id.as_str())),
                ("channel_id", json(path.channel_id.as_str())),
            ],
            Self::IbcTransferCompleted { id, sequence, path }
            | Self::IbcTransferFailed { id, sequence, path } => vec![
                ("id", json(&id.to_string())),
                ("sequence", json(&sequence.to_string())),
                ("port_id", json(path.port_id.as_str())),
                ("channel_id", json(path.channel_id.as_str())),
            ],
            Self::IbcTransferRetried {
                id,
                receiver,
                asset,
                path,
            } => vec![
                ("id", json(&id.to_string())),
                ("recipient", json(receiver)),
                ("asset", json(&asset.to_string())),
                ("port_id", json(path.port_id.as_str())),
                ("channel_id", json(path.channel_id.as_str())),
            ],
            Self::FeePaid {
                message_id,
                recipient,
                fee,
            } => vec![
                ("message_id", json(message_id)),
                ("recipient", json(recipient)),
                ("fee", json(&fee.to_string())),
            ],
            Self::ContractCallSubmitted {
                message_id,
                sender,
                source_chain,
                destination_chain,
                contract_address,
                payload,
                payload_hash,
            } => vec![
                ("message_id", json(message_id)),
                ("sender", json(sender)),
                ("source_chain", json(source_chain.as_str())),
                ("destination_chain", json(destination_chain.as_str())),
                ("contract_address", json(contract_address)),
                ("payload", json(&hex::encode(payload))),
                ("payload_hash", json(&hex::encode(payload_hash))),
            ],
            Self::ContractCallWithTokenSubmitted {
                message_id,
                sender,
                source_chain,
                destination_chain,
                contract_address,
                payload,
                payload_hash,
                asset,
            } => vec![
                ("message_id", json(message_id)),
                ("sender", json(sender)),
                ("source_chain", json(source_chain.as_str())),
                ("destination_chain", json(destination_chain.as_str())),
                ("contract_address", json(contract_address)),
                ("payload", json(&hex::encode(payload))),
                ("payload_hash", json(&hex::encode(payload_hash))),
                ("asset", json(&asset.to_string())),
            ],
            Self::TokenSent {
                transfer_id,
                sender,
                source_chain,
                destination_chain,
                destination_address,
                asset,
            } => vec![
                ("transfer_id", json(&transfer_id.to_string())),
                ("sender", json(sender)),
                ("source_chain", json(source_chain.as_str())),
                ("destination_chain", json(destination_chain.as_str())),
                ("destination_address", json(destination_address)),
                ("asset", json(&asset.to_string())),
            ],
        }
    }
}

impl From<Event> for AbciEvent {
    fn from(event: Event) -> Self {
        AbciEvent::new(
            format!("{EVENT_TYPE_PREFIX}.{}", event.name()),
            event.attributes(),
        )
    }
}
