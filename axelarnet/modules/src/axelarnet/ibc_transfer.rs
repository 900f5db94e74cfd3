use std::fmt::Debug;

use axelarnet_store::context::SavepointStore;
use ibc::core::channel::types::timeout::TimeoutHeight;
use ibc::core::client::types::Height;
use ibc::primitives::Timestamp;
use tracing::info;

use super::context::{ChannelKeeper, IbcTransferKeeper, Nexus};
use super::error::Error;
use super::events::Event;
use super::impls::Axelarnet;
use super::nexus::CrossChainAddress;
use super::packet::MsgTransfer;
use super::types::{gmp_account, IbcPath, IbcTransfer};
use crate::bank::{BankKeeper, Coin};

impl<S, N, B, C, T> Axelarnet<S, N, B, C, T>
where
    S: SavepointStore + Debug,
    N: Nexus,
    B: BankKeeper,
    C: ChannelKeeper,
    T: IbcTransferKeeper,
{
    /// Maps the sequence the transfer's channel will assign next to the transfer id. Must run
    /// before the packet is sent.
    pub fn set_seq_id_mapping(&mut self, transfer: &IbcTransfer) -> Result<(), Error> {
        let sequence = self
            .channel
            .get_next_sequence_send(&transfer.port_id, &transfer.channel_id)
            .ok_or_else(|| Error::NextSequenceNotFound {
                port: transfer.port_id.to_string(),
                channel: transfer.channel_id.to_string(),
            })?;
        self.keeper
            .set_seq_id_mapping(&transfer.path(), sequence, transfer.id)
    }

    /// Counterparty client height plus the route timeout window.
    pub fn packet_timeout_height(&self, path: &IbcPath) -> Result<Height, Error> {
        let latest = self
            .channel
            .get_channel_client_latest_height(&path.port_id, &path.channel_id)
            .map_err(Error::channel)?;
        let window = self.keeper.get_params().route_timeout_window;
        Ok(latest.add(window))
    }

    /// Sends a routed transfer over its path and records the packet sequence it went out with.
    ///
    /// The packet leaves through [`Self::send_packet`], which skips rate limiting for routed
    /// transfers because the registry already accounted for them.
    pub fn send_ibc_transfer(&mut self, mut transfer: IbcTransfer) -> Result<(), Error> {
        self.set_seq_id_mapping(&transfer)?;

        let path = transfer.path();
        let timeout_height = self.packet_timeout_height(&path)?;
        let msg = MsgTransfer {
            port_id_on_a: transfer.port_id.clone(),
            chan_id_on_a: transfer.channel_id.clone(),
            token: transfer.token.clone(),
            sender: transfer.sender.clone(),
            receiver: transfer.receiver.clone(),
            timeout_height_on_b: TimeoutHeight::At(timeout_height),
            timeout_timestamp_on_b: Timestamp::none(),
            memo: String::new(),
        };
        let packet = self
            .transfer
            .send_transfer(msg)
            .map_err(Error::transfer)?;
        self.send_packet(&packet)?;
        let sequence = packet.seq_on_a;

        info!(
            "sent IBC transfer {} of {} to {} with sequence {}",
            transfer.id, transfer.token, transfer.receiver, sequence
        );
        self.emit(Event::IbcTransferSent {
            id: transfer.id,
            receiver: transfer.receiver.clone(),
            asset: transfer.token.clone(),
            sequence: sequence.into(),
            path,
        });

        transfer.sequence = Some(sequence);
        self.keeper.set_transfer(transfer)
    }

    /// Delivers a general message to a cosmos chain as an ICS-20 transfer from the GMP account
    /// carrying `payload` in its memo, and maps the packet sequence to the message id.
    ///
    /// Message packets count against the destination chain's outgoing rate limit. Nothing is
    /// kept when any step fails.
    pub fn send_message(
        &mut self,
        recipient: &CrossChainAddress,
        asset: Coin,
        payload: String,
        id: String,
    ) -> Result<(), Error> {
        self.atomically(|app| {
            let path = app
                .keeper
                .get_ibc_path(&recipient.chain.name)
                .ok_or_else(|| Error::IbcPathNotFound {
                    chain: recipient.chain.name.to_string(),
                })?;
            let timeout_height = app.packet_timeout_height(&path)?;

            let msg = MsgTransfer {
                port_id_on_a: path.port_id.clone(),
                chan_id_on_a: path.channel_id.clone(),
                token: asset,
                sender: gmp_account(),
                receiver: recipient.address.clone(),
                timeout_height_on_b: TimeoutHeight::At(timeout_height),
                timeout_timestamp_on_b: Timestamp::none(),
                memo: payload,
            };
            let packet = app.transfer.send_transfer(msg).map_err(Error::transfer)?;
            app.send_packet(&packet)?;

            info!(
                "sent message {} to {} with sequence {}",
                id, recipient, packet.seq_on_a
            );
            app.keeper
                .set_seq_message_id_mapping(&path, packet.seq_on_a, id)
        })
    }
}

#[cfg(test)]
mod tests {
    use ibc::core::host::types::identifiers::{ChannelId, Sequence};

    use super::*;
    use crate::axelarnet::nexus::{Chain, ChainName, TransferDirection, TransferId};
    use crate::axelarnet::testing::{fixture, osmo_path};
    use crate::axelarnet::types::ibc_account;

    fn transfer(id: u64) -> IbcTransfer {
        let path = osmo_path();
        IbcTransfer::new(
            TransferId(id),
            ibc_account(),
            "osmo1receiver".to_owned(),
            Coin::new("uaxl", 10u64),
            path.port_id,
            path.channel_id,
        )
    }

    #[test]
    fn timeout_height_adds_the_window() {
        let f = fixture();
        let height = f.app.packet_timeout_height(&osmo_path()).unwrap();
        assert_eq!(height.revision_number(), 1);
        assert_eq!(height.revision_height(), 100 + 17_000);
    }

    #[test]
    fn send_records_mapping_and_sequence() {
        let mut f = fixture();
        let transfer = transfer(5);
        f.app.keeper_mut().set_transfer(transfer.clone()).unwrap();

        f.app.send_ibc_transfer(transfer).unwrap();

        let seq = Sequence::from(1);
        assert_eq!(
            f.app.keeper().get_seq_id_mapping(&osmo_path(), seq),
            Some(TransferId(5))
        );
        let stored = f.app.keeper().get_transfer(TransferId(5)).unwrap();
        assert_eq!(stored.sequence, Some(seq));

        let sent = f.ibc.sent_transfers();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].sender, ibc_account());
        assert!(matches!(
            sent[0].timeout_height_on_b,
            TimeoutHeight::At(h) if h.revision_height() == 17_100
        ));
        // routed transfers were rate limited when the registry enqueued them
        assert_eq!(f.ibc.sent_packets().len(), 1);
        assert!(f.app.nexus().rate_limited.is_empty());
        assert!(matches!(
            f.app.take_events().as_slice(),
            [Event::IbcTransferSent { sequence: 1, .. }]
        ));
    }

    #[test]
    fn send_fails_without_next_sequence() {
        let mut f = fixture();
        let mut transfer = transfer(1);
        transfer.channel_id = ChannelId::new(8);
        assert!(matches!(
            f.app.send_ibc_transfer(transfer),
            Err(Error::NextSequenceNotFound { .. })
        ));
        assert!(f.ibc.sent_transfers().is_empty());
    }

    #[test]
    fn send_message_maps_the_assigned_sequence() {
        let mut f = fixture();
        let recipient = CrossChainAddress {
            chain: Chain {
                name: ChainName::new("osmosis").unwrap(),
                module: "axelarnet".to_owned(),
                supports_foreign_assets: true,
            },
            address: "osmo1contract".to_owned(),
        };

        f.app
            .send_message(
                &recipient,
                Coin::new("uaxl", 1u64),
                "{\"payload\":1}".to_owned(),
                "msg-1".to_owned(),
            )
            .unwrap();

        assert_eq!(
            f.app
                .keeper()
                .get_seq_message_id_mapping(&osmo_path(), Sequence::from(1)),
            Some("msg-1".to_owned())
        );
        let sent = f.ibc.sent_transfers();
        assert_eq!(sent[0].sender, gmp_account());
        assert_eq!(sent[0].memo, "{\"payload\":1}");

        // message packets count as value leaving for osmosis
        assert_eq!(f.ibc.sent_packets().len(), 1);
        assert_eq!(
            f.app.nexus().rate_limited,
            vec![(
                ChainName::new("osmosis").unwrap(),
                Coin::new("uaxl", 1u64),
                TransferDirection::Outgoing
            )]
        );
    }

    #[test]
    fn send_message_keeps_nothing_when_rate_limited() {
        let mut f = fixture();
        let recipient = CrossChainAddress {
            chain: f
                .app
                .nexus()
                .get_chain(&ChainName::new("osmosis").unwrap())
                .unwrap(),
            address: "osmo1contract".to_owned(),
        };
        f.app.nexus_mut().rate_limit_exceeded = true;

        assert!(matches!(
            f.app.send_message(
                &recipient,
                Coin::new("uaxl", 1u64),
                "{}".to_owned(),
                "msg-1".to_owned(),
            ),
            Err(Error::Nexus { .. })
        ));
        assert!(f
            .app
            .keeper()
            .get_seq_message_id_mapping(&osmo_path(), Sequence::from(1))
            .is_none());
    }

    #[test]
    fn send_message_needs_a_path() {
        let mut f = fixture();
        let recipient = CrossChainAddress {
            chain: Chain::hub(),
            address: "axelar1contract".to_owned(),
        };
        assert!(matches!(
            f.app.send_message(
                &recipient,
                Coin::new("uaxl", 1u64),
                "{}".to_owned(),
                "msg-1".to_owned(),
            ),
            Err(Error::IbcPathNotFound { .. })
        ));
        assert!(f.ibc.sent_transfers().is_empty());
    }
}
