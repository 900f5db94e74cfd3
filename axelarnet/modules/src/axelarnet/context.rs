use core::fmt::Display;

use ibc::core::channel::types::acknowledgement::AcknowledgementStatus;
use ibc::core::client::types::Height;
use ibc::core::host::types::identifiers::{ChannelId, PortId, Sequence};

use super::denom::DenomTrace;
use super::nexus::{
    Chain, ChainName, CrossChainAddress, CrossChainTransfer, GeneralMessage, TransferDirection,
    TransferId, TransferState,
};
use super::packet::{MsgTransfer, Packet};
use crate::bank::Coin;

/// The cross-chain registry: chains, assets, transfers, general messages and rate limits.
pub trait Nexus {
    type Error: Display;

    fn get_chain(&self, chain: &ChainName) -> Option<Chain>;

    fn set_chain(&mut self, chain: Chain);

    fn is_chain_activated(&self, chain: &Chain) -> bool;

    /// The chain on which `asset` is native, if any
    fn get_chain_by_native_asset(&self, asset: &str) -> Option<Chain>;

    fn is_asset_registered(&self, chain: &Chain, asset: &str) -> bool;

    fn register_asset(&mut self, chain: &Chain, asset: &str, is_native: bool)
        -> Result<(), Self::Error>;

    /// Checks that `address` is well-formed for its chain
    fn validate_address(&self, address: &CrossChainAddress) -> Result<(), Self::Error>;

    /// Records a transfer of `asset` from `source` to `recipient`
    fn enqueue_transfer(
        &mut self,
        source: &Chain,
        recipient: CrossChainAddress,
        asset: Coin,
    ) -> Result<TransferId, Self::Error>;

    fn get_transfers_for_chain(
        &self,
        chain: &Chain,
        state: TransferState,
        limit: u64,
    ) -> Vec<CrossChainTransfer>;

    fn archive_pending_transfer(&mut self, transfer: &CrossChainTransfer);

    /// Accounts `asset` against the chain's rate limit; fails when the limit is exceeded
    fn rate_limit_transfer(
        &mut self,
        chain: &ChainName,
        asset: &Coin,
        direction: TransferDirection,
    ) -> Result<(), Self::Error>;

    /// Returns a fresh message id along with the originating tx hash and index
    fn generate_message_id(&mut self) -> (String, [u8; 32], u64);

    fn set_new_message(&mut self, message: GeneralMessage) -> Result<(), Self::Error>;

    fn get_message(&self, id: &str) -> Option<GeneralMessage>;

    /// Marks an approved or previously failed message as being routed
    fn set_message_processing(&mut self, id: &str) -> Result<(), Self::Error>;

    fn set_message_executed(&mut self, id: &str) -> Result<(), Self::Error>;

    fn set_message_failed(&mut self, id: &str) -> Result<(), Self::Error>;
}

/// Channel-level IBC access.
pub trait ChannelKeeper {
    type Error: Display;

    fn get_next_sequence_send(&self, port_id: &PortId, channel_id: &ChannelId) -> Option<Sequence>;

    /// Latest height of the counterparty client behind the channel
    fn get_channel_client_latest_height(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<Height, Self::Error>;

    fn send_packet(&mut self, packet: &Packet) -> Result<(), Self::Error>;
}

/// The ICS-20 transfer application this gateway wraps.
pub trait IbcTransferKeeper {
    type Error: Display;

    fn get_denom_trace(&self, hash: &[u8; 32]) -> Option<DenomTrace>;

    /// Escrows or burns the tokens of an ICS-20 transfer and builds its packet, with the
    /// channel's next send sequence. Sending the packet is left to the caller.
    fn send_transfer(&mut self, msg: MsgTransfer) -> Result<Packet, Self::Error>;

    fn on_recv_packet(&mut self, packet: &Packet) -> AcknowledgementStatus;

    fn on_acknowledgement_packet(
        &mut self,
        packet: &Packet,
        acknowledgement: &[u8],
    ) -> Result<(), Self::Error>;

    fn on_timeout_packet(&mut self, packet: &Packet) -> Result<(), Self::Error>;
}
