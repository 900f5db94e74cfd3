use std::fmt::Debug;

use axelarnet_store::context::SavepointStore;
use cosmrs::AccountId;
use tracing::info;

use super::context::{ChannelKeeper, IbcTransferKeeper, Nexus};
use super::error::Error;
use super::impls::Axelarnet;
use super::message_handler::keccak256;
use super::nexus::{GeneralMessage, MessageStatus, MODULE_NAME};
use super::payload::translate_message;
use super::types::{gmp_account, ibc_account, NATIVE_ASSET};
use crate::bank::{BankKeeper, Coin};

/// What a routing request supplies besides the message itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingContext {
    /// Pays the dust amount a pure message travels with
    pub sender: AccountId,
    /// The ABI-encoded payload the message commits to
    pub payload: Option<Vec<u8>>,
}

impl<S, N, B, C, T> Axelarnet<S, N, B, C, T>
where
    S: SavepointStore + Debug,
    N: Nexus,
    B: BankKeeper,
    C: ChannelKeeper,
    T: IbcTransferKeeper,
{
    /// Routes the registry's general message `id` to its cosmos recipient and marks it as
    /// processing. Approved and previously failed messages can be routed.
    pub fn route_general_message(&mut self, id: &str, ctx: &RoutingContext) -> Result<(), Error> {
        let msg = self
            .nexus
            .get_message(id)
            .ok_or_else(|| Error::GeneralMessage {
                reason: format!("general message {id} not found"),
            })?;
        if !matches!(msg.status, MessageStatus::Approved | MessageStatus::Failed) {
            return Err(Error::GeneralMessage {
                reason: format!("general message {id} has to be approved or failed"),
            });
        }
        if !msg.recipient.chain.is_from(MODULE_NAME) {
            return Err(Error::GeneralMessage {
                reason: format!(
                    "general message {id} is destined to {} which is not a cosmos chain",
                    msg.recipient.chain.name
                ),
            });
        }
        if let Some(payload) = &ctx.payload {
            if keccak256(payload) != msg.payload_hash {
                return Err(Error::InvalidPayload {
                    reason: "payload hash does not match".to_owned(),
                });
            }
        }

        self.route_message(ctx, &msg)?;
        self.nexus
            .set_message_processing(id)
            .map_err(Error::nexus)
    }

    /// Delivers `msg` to a cosmos chain: the payload is translated into the packet memo and
    /// the message's asset, or a dust amount of the native asset for pure messages, is moved
    /// to the GMP account the packet is sent from. Nothing is kept when any step fails.
    pub fn route_message(&mut self, ctx: &RoutingContext, msg: &GeneralMessage) -> Result<(), Error> {
        let payload = ctx.payload.as_deref().ok_or_else(|| Error::GeneralMessage {
            reason: "payload is required for routing messages to a cosmos chain".to_owned(),
        })?;
        let memo = translate_message(msg, payload)?;

        self.atomically(|app| {
            let asset = app.escrow_asset_to_message_sender(ctx, msg)?;
            app.send_message(&msg.recipient, asset, memo, msg.id.clone())
        })?;

        info!("routed general message {} to {}", msg.id, msg.recipient);
        Ok(())
    }

    // receivers authenticate general messages by the GMP account sending them
    fn escrow_asset_to_message_sender(
        &mut self,
        ctx: &RoutingContext,
        msg: &GeneralMessage,
    ) -> Result<Coin, Error> {
        let (sender, asset) = match &msg.asset {
            None => (ctx.sender.clone(), Coin::new(NATIVE_ASSET, 1u64)),
            Some(asset) => {
                let coin = self.coin_from_registry(asset.clone())?;
                self.unlock_coin(&coin, ibc_account())?;
                (ibc_account(), coin.original_coin())
            }
        };

        self.bank
            .send_coins(sender, gmp_account(), [asset.clone()])
            .map_err(Error::bank)?;
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use ibc::core::host::types::identifiers::Sequence;

    use super::*;
    use crate::axelarnet::nexus::{Chain, ChainName, CrossChainAddress, TransferDirection};
    use crate::axelarnet::payload::tests::versioned_payload;
    use crate::axelarnet::testing::{fixture, osmo_path, Fixture};
    use crate::axelarnet::types::escrow_address;
    use crate::bank::Denom;

    const ID: &str = "0xfeed-3";

    fn sender() -> AccountId {
        AccountId::new("axelar", &[7; 20]).unwrap()
    }

    fn chain(f: &Fixture, name: &str) -> Chain {
        f.app
            .nexus()
            .get_chain(&ChainName::new(name).unwrap())
            .unwrap()
    }

    /// Approves a message from Ethereum to `osmo1contract` committing to `payload`.
    fn approve(f: &mut Fixture, payload: &[u8], asset: Option<Coin>) -> GeneralMessage {
        let msg = GeneralMessage::new(
            ID.to_owned(),
            CrossChainAddress {
                chain: chain(f, "Ethereum"),
                address: "0x68B93045fe7D8794a7cAF327e7f855CD6Cd03BB8".to_owned(),
            },
            CrossChainAddress {
                chain: chain(f, "osmosis"),
                address: "osmo1contract".to_owned(),
            },
            keccak256(payload),
            ([0xcd; 32], 3),
            asset,
        );
        f.app.nexus_mut().set_new_message(msg.clone()).unwrap();
        msg
    }

    fn ctx(payload: &[u8]) -> RoutingContext {
        RoutingContext {
            sender: sender(),
            payload: Some(payload.to_vec()),
        }
    }

    fn balance(f: &Fixture, account: &AccountId, denom: &str) -> u64 {
        f.app
            .bank()
            .get_balance(account, &Denom::from(denom))
            .amount
            .as_u64()
    }

    fn status(f: &Fixture) -> MessageStatus {
        f.app.nexus().get_message(ID).unwrap().status
    }

    #[test]
    fn pure_message_travels_with_dust_from_the_sender() {
        let mut f = fixture();
        f.app
            .bank_mut()
            .mint_coins(sender(), [Coin::new(NATIVE_ASSET, 5u64)])
            .unwrap();
        let payload = versioned_payload(0, b"hello");
        approve(&mut f, &payload, None);

        f.app.route_general_message(ID, &ctx(&payload)).unwrap();

        assert_eq!(status(&f), MessageStatus::Processing);
        assert_eq!(balance(&f, &sender(), NATIVE_ASSET), 4);
        assert_eq!(balance(&f, &gmp_account(), NATIVE_ASSET), 1);

        let sent = f.ibc.sent_transfers();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].sender, gmp_account());
        assert_eq!(sent[0].receiver, "osmo1contract");
        assert_eq!(sent[0].token, Coin::new(NATIVE_ASSET, 1u64));
        assert!(sent[0].memo.contains(r#""payload":"aGVsbG8=","type":1"#));

        assert_eq!(
            f.app
                .keeper()
                .get_seq_message_id_mapping(&osmo_path(), Sequence::from(1)),
            Some(ID.to_owned())
        );
        assert_eq!(
            f.app.nexus().rate_limited,
            vec![(
                ChainName::new("osmosis").unwrap(),
                Coin::new(NATIVE_ASSET, 1u64),
                TransferDirection::Outgoing
            )]
        );
    }

    #[test]
    fn token_message_sends_the_unlocked_asset() {
        let mut f = fixture();
        f.app
            .bank_mut()
            .mint_coins(escrow_address(NATIVE_ASSET), [Coin::new(NATIVE_ASSET, 7u64)])
            .unwrap();
        let payload = versioned_payload(2, br#"{"swap":{"min_out":"3"}}"#);
        approve(&mut f, &payload, Some(Coin::new(NATIVE_ASSET, 7u64)));

        f.app.route_general_message(ID, &ctx(&payload)).unwrap();

        assert_eq!(balance(&f, &escrow_address(NATIVE_ASSET), NATIVE_ASSET), 0);
        assert_eq!(balance(&f, &ibc_account(), NATIVE_ASSET), 0);
        assert_eq!(balance(&f, &gmp_account(), NATIVE_ASSET), 7);

        let sent = f.ibc.sent_transfers();
        assert_eq!(sent[0].token, Coin::new(NATIVE_ASSET, 7u64));
        assert!(sent[0]
            .memo
            .ends_with(r#""contract":"osmo1contract","msg":{"swap":{"min_out":"3"}}}}"#));
    }

    #[test]
    fn failed_routing_keeps_nothing() {
        let mut f = fixture();
        f.app
            .bank_mut()
            .mint_coins(sender(), [Coin::new(NATIVE_ASSET, 1u64)])
            .unwrap();
        let payload = versioned_payload(0, b"hello");
        approve(&mut f, &payload, None);
        f.app.nexus_mut().rate_limit_exceeded = true;

        assert!(matches!(
            f.app.route_general_message(ID, &ctx(&payload)),
            Err(Error::Nexus { .. })
        ));

        assert_eq!(status(&f), MessageStatus::Approved);
        assert_eq!(balance(&f, &sender(), NATIVE_ASSET), 1);
        assert_eq!(balance(&f, &gmp_account(), NATIVE_ASSET), 0);
        assert_eq!(
            f.app
                .keeper()
                .get_seq_message_id_mapping(&osmo_path(), Sequence::from(1)),
            None
        );
    }

    #[test]
    fn pure_message_needs_a_funded_sender() {
        let mut f = fixture();
        let payload = versioned_payload(0, b"hello");
        approve(&mut f, &payload, None);

        assert!(matches!(
            f.app.route_general_message(ID, &ctx(&payload)),
            Err(Error::Bank { .. })
        ));
        assert_eq!(status(&f), MessageStatus::Approved);
        assert!(f.ibc.sent_transfers().is_empty());
    }

    #[test]
    fn payload_must_be_present_and_match() {
        let mut f = fixture();
        let payload = versioned_payload(0, b"hello");
        let msg = approve(&mut f, &payload, None);

        let no_payload = RoutingContext {
            sender: sender(),
            payload: None,
        };
        assert!(matches!(
            f.app.route_message(&no_payload, &msg),
            Err(Error::GeneralMessage { .. })
        ));
        assert!(matches!(
            f.app
                .route_general_message(ID, &ctx(&versioned_payload(0, b"other"))),
            Err(Error::InvalidPayload { .. })
        ));

        let v1 = versioned_payload(1, b"");
        let msg = GeneralMessage {
            payload_hash: keccak256(&v1),
            ..msg
        };
        assert!(matches!(
            f.app.route_message(&ctx(&v1), &msg),
            Err(Error::InvalidPayload { .. })
        ));
        assert_eq!(status(&f), MessageStatus::Approved);
    }

    #[test]
    fn only_routable_messages_to_cosmos_chains_are_routed() {
        let mut f = fixture();
        let payload = versioned_payload(0, b"hello");

        assert!(f.app.route_general_message(ID, &ctx(&payload)).is_err());

        approve(&mut f, &payload, None);
        f.app.nexus_mut().set_message_executed(ID).unwrap();
        assert!(f.app.route_general_message(ID, &ctx(&payload)).is_err());

        let mut to_evm = f.app.nexus().get_message(ID).unwrap();
        to_evm.id = "0xfeed-4".to_owned();
        to_evm.status = MessageStatus::Approved;
        to_evm.recipient.chain = chain(&f, "Ethereum");
        f.app.nexus_mut().set_new_message(to_evm).unwrap();
        assert!(matches!(
            f.app.route_general_message("0xfeed-4", &ctx(&payload)),
            Err(Error::GeneralMessage { .. })
        ));
    }

    #[test]
    fn failed_messages_can_be_retried() {
        let mut f = fixture();
        f.app
            .bank_mut()
            .mint_coins(sender(), [Coin::new(NATIVE_ASSET, 1u64)])
            .unwrap();
        let payload = versioned_payload(0, b"hello");
        approve(&mut f, &payload, None);
        f.app.nexus_mut().set_message_failed(ID).unwrap();

        f.app.route_general_message(ID, &ctx(&payload)).unwrap();
        assert_eq!(status(&f), MessageStatus::Processing);
    }
}
