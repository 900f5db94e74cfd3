use cosmrs::AccountId;
use ibc::apps::transfer::types::ack_success_b64;
use ibc::core::channel::types::acknowledgement::{AcknowledgementStatus, StatusValue};
use ibc::core::channel::types::timeout::TimeoutHeight;
use ibc::core::host::types::identifiers::{ChannelId, PortId};
use ibc::primitives::Timestamp;
use ibc_proto::ibc::applications::transfer::v2::FungibleTokenPacketData;

pub use ibc::core::channel::types::packet::Packet;

use super::error::Error;
use super::types::IbcPath;
use crate::bank::Coin;

/// Both ends of a packet as the gateway's path type.
pub trait PacketPaths {
    /// The sending side's path
    fn source_path(&self) -> IbcPath;
    /// The receiving side's path
    fn destination_path(&self) -> IbcPath;
}

impl PacketPaths for Packet {
    fn source_path(&self) -> IbcPath {
        IbcPath::new(self.port_id_on_a.clone(), self.chan_id_on_a.clone())
    }

    fn destination_path(&self) -> IbcPath {
        IbcPath::new(self.port_id_on_b.clone(), self.chan_id_on_b.clone())
    }
}

/// Decodes the JSON ICS-20 payload of a packet.
pub fn decode_packet_data(bytes: &[u8]) -> Result<FungibleTokenPacketData, Error> {
    serde_json::from_slice(bytes).map_err(|e| Error::InvalidPacketData {
        reason: e.to_string(),
    })
}

/// Decodes a JSON acknowledgement envelope.
pub fn decode_acknowledgement(bytes: &[u8]) -> Result<AcknowledgementStatus, Error> {
    serde_json::from_slice(bytes).map_err(|e| Error::InvalidAcknowledgement {
        reason: e.to_string(),
    })
}

/// The ICS-20 success acknowledgement, `{"result":"AQ=="}`.
pub fn success_acknowledgement() -> AcknowledgementStatus {
    AcknowledgementStatus::success(ack_success_b64())
}

/// An error acknowledgement carrying `reason`, or a generic one when `reason` is empty.
pub fn error_acknowledgement(reason: impl ToString) -> AcknowledgementStatus {
    let value = StatusValue::new(reason)
        .or_else(|_| StatusValue::new("unknown error"))
        .expect("non-empty status value"); // safety - the fallback is not empty
    AcknowledgementStatus::error(value)
}

/// An ICS-20 transfer request handed to the transfer keeper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgTransfer {
    pub port_id_on_a: PortId,
    pub chan_id_on_a: ChannelId,
    pub token: Coin,
    pub sender: AccountId,
    pub receiver: String,
    pub timeout_height_on_b: TimeoutHeight,
    pub timeout_timestamp_on_b: Timestamp,
    pub memo: String,
}
