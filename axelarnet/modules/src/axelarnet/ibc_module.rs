use std::fmt::Debug;

use axelarnet_store::context::SavepointStore;
use ibc::core::channel::types::acknowledgement::AcknowledgementStatus;
use tracing::{debug, info};

use super::context::{ChannelKeeper, IbcTransferKeeper, Nexus};
use super::denom::{parse_denom, VoucherDenom};
use super::error::Error;
use super::events::Event;
use super::impls::Axelarnet;
use super::nexus::TransferDirection;
use super::packet::{decode_acknowledgement, decode_packet_data, Packet, PacketPaths};
use super::rate_limit::parse_positive_amount;
use super::types::gmp_account;
use crate::bank::{BankKeeper, Coin};

impl<S, N, B, C, T> Axelarnet<S, N, B, C, T>
where
    S: SavepointStore + Debug,
    N: Nexus,
    B: BankKeeper,
    C: ChannelKeeper,
    T: IbcTransferKeeper,
{
    /// Lets the transfer application credit the packet, then handles any general message it
    /// carries.
    pub fn on_recv_packet(&mut self, packet: &Packet) -> AcknowledgementStatus {
        let ack = self.transfer.on_recv_packet(packet);
        if !ack.is_successful() {
            return ack;
        }
        self.on_recv_message(packet)
    }

    /// Resolves the transfer or message behind an acknowledged packet.
    ///
    /// The resolution is all or nothing: when it fails, the sequence mapping stays in place so
    /// that a later attempt can still resolve the packet.
    pub fn on_acknowledgement_packet(
        &mut self,
        packet: &Packet,
        acknowledgement: &[u8],
    ) -> Result<(), Error> {
        self.transfer
            .on_acknowledgement_packet(packet, acknowledgement)
            .map_err(Error::transfer)?;

        match decode_acknowledgement(acknowledgement)? {
            AcknowledgementStatus::Success(_) => {
                self.atomically(|app| app.set_routed_packet_completed(packet))
            }
            AcknowledgementStatus::Error(e) => {
                debug!(
                    "packet {} on {} was rejected: {}",
                    packet.seq_on_a,
                    packet.source_path(),
                    e
                );
                self.atomically(|app| app.refund_packet(packet))
            }
        }
    }

    /// Same as an error acknowledgement: the tokens were refunded by the transfer application.
    pub fn on_timeout_packet(&mut self, packet: &Packet) -> Result<(), Error> {
        self.transfer
            .on_timeout_packet(packet)
            .map_err(Error::transfer)?;
        self.atomically(|app| app.refund_packet(packet))
    }

    fn refund_packet(&mut self, packet: &Packet) -> Result<(), Error> {
        self.set_routed_packet_failed(packet)?;
        // refunds bring value back into the hub
        self.rate_limit_packet(packet, TransferDirection::Incoming, &packet.source_path())
    }

    fn set_routed_packet_completed(&mut self, packet: &Packet) -> Result<(), Error> {
        let path = packet.source_path();
        let sequence = packet.seq_on_a;

        if let Some(id) = self.keeper.get_seq_id_mapping(&path, sequence) {
            self.keeper.set_transfer_completed(id)?;
            self.keeper.delete_seq_id_mapping(&path, sequence);
            info!("IBC transfer {} completed", id);
            self.emit(Event::IbcTransferCompleted {
                id,
                sequence: sequence.into(),
                path,
            });
            return Ok(());
        }

        if let Some(id) = self.keeper.get_seq_message_id_mapping(&path, sequence) {
            self.nexus.set_message_executed(&id).map_err(Error::nexus)?;
            self.keeper.delete_seq_message_id_mapping(&path, sequence);
            info!("general message {} executed", id);
        }

        Ok(())
    }

    fn set_routed_packet_failed(&mut self, packet: &Packet) -> Result<(), Error> {
        let path = packet.source_path();
        let sequence = packet.seq_on_a;

        if let Some(id) = self.keeper.get_seq_id_mapping(&path, sequence) {
            self.keeper.set_transfer_failed(id)?;
            self.keeper.delete_seq_id_mapping(&path, sequence);
            info!("IBC transfer {} failed", id);
            self.emit(Event::IbcTransferFailed {
                id,
                sequence: sequence.into(),
                path,
            });
            return Ok(());
        }

        if let Some(id) = self.keeper.get_seq_message_id_mapping(&path, sequence) {
            // the refund landed in the GMP account; take it back into custody
            let data = decode_packet_data(&packet.data)?;
            let amount = parse_positive_amount(&data.amount)?;
            let denom = parse_denom(&data.denom)?.ibc_denom();
            let coin = self.new_coin(Coin::new(denom, amount))?;
            self.lock_coin(&coin, gmp_account())?;

            // the registry is written last, once nothing else can fail
            self.nexus.set_message_failed(&id).map_err(Error::nexus)?;
            self.keeper.delete_seq_message_id_mapping(&path, sequence);
            info!("general message {} failed", id);
        }

        Ok(())
    }
}
