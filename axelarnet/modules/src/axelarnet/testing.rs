//! Recording test doubles for the gateway's collaborators.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use axelarnet_store::impls::{InMemoryStore, RevertibleStore, SharedStore};
use ibc::core::channel::types::acknowledgement::AcknowledgementStatus;
use ibc::core::channel::types::timeout::TimeoutHeight;
use ibc::core::client::types::Height;
use ibc::core::host::types::identifiers::{ChannelId, PortId, Sequence};
use ibc::primitives::Timestamp;
use ibc_proto::ibc::applications::transfer::v2::FungibleTokenPacketData;

use super::context::{ChannelKeeper, IbcTransferKeeper, Nexus};
use super::denom::{parse_denom, DenomTrace, VoucherDenom};
use super::impls::Axelarnet;
use super::nexus::{
    Chain, ChainName, CrossChainAddress, CrossChainTransfer, GeneralMessage, MessageStatus,
    TransferDirection, TransferId, TransferState, EVM_MODULE, MODULE_NAME,
};
use super::packet::{success_acknowledgement, MsgTransfer, Packet};
use super::types::{module_account, CosmosChain, IbcPath};
use crate::bank::{BankBalanceKeeper, Coin};

pub(crate) type TestStore = RevertibleStore<InMemoryStore>;

pub(crate) type TestApp = Axelarnet<
    TestStore,
    MockNexus,
    BankBalanceKeeper<TestStore>,
    MockChannel,
    MockTransfer,
>;

pub(crate) struct Fixture {
    pub app: TestApp,
    pub ibc: MockIbc,
}

/// A hub connected to `osmosis` over `transfer/channel-0`, plus an EVM chain `Ethereum`.
///
/// `uaxl` is native to the hub, `uosmo` to osmosis and `weth-wei` to Ethereum; every asset is
/// registered on every chain.
pub(crate) fn fixture() -> Fixture {
    let store = SharedStore::new(TestStore::default());

    let ibc = MockIbc::default();
    ibc.set_next_sequence(&osmo_path(), 1);
    ibc.set_client_height(100);
    ibc.register_trace(parse_denom(&format!("{}/uosmo", osmo_path())).unwrap());

    let hub = Chain::hub();
    let osmosis = Chain {
        name: ChainName::new("osmosis").unwrap(),
        module: MODULE_NAME.to_owned(),
        supports_foreign_assets: true,
    };
    let ethereum = Chain {
        name: ChainName::new("Ethereum").unwrap(),
        module: EVM_MODULE.to_owned(),
        supports_foreign_assets: true,
    };

    let mut nexus = MockNexus::default();
    for chain in [&hub, &osmosis, &ethereum] {
        nexus.set_chain(chain.clone());
    }
    for (native, asset) in [(&hub, "uaxl"), (&osmosis, "uosmo"), (&ethereum, "weth-wei")] {
        for chain in [&hub, &osmosis, &ethereum] {
            let is_native = chain.name == native.name;
            nexus.register_asset(chain, asset, is_native).unwrap();
        }
    }

    let bank = BankBalanceKeeper::new(store.clone()).with_blocked_addrs([module_account()]);
    let mut app = Axelarnet::new(
        store,
        nexus,
        bank,
        MockChannel(ibc.clone()),
        MockTransfer(ibc.clone()),
    );

    let keeper = app.keeper_mut();
    keeper
        .set_cosmos_chain(CosmosChain {
            name: hub.name,
            ibc_path: None,
            addr_prefix: "axelar".to_owned(),
        })
        .unwrap();
    keeper
        .set_cosmos_chain(CosmosChain {
            name: osmosis.name.clone(),
            ibc_path: None,
            addr_prefix: "osmo".to_owned(),
        })
        .unwrap();
    keeper.register_ibc_path(&osmosis.name, osmo_path()).unwrap();

    Fixture { app, ibc }
}

/// The hub side of the osmosis channel.
pub(crate) fn osmo_path() -> IbcPath {
    IbcPath::new(PortId::transfer(), ChannelId::new(0))
}

/// `uosmo` as held on the hub.
pub(crate) fn uosmo_voucher() -> String {
    parse_denom(&format!("{}/uosmo", osmo_path()))
        .unwrap()
        .ibc_denom()
}

pub(crate) fn packet_data(
    denom: &str,
    amount: &str,
    sender: &str,
    receiver: &str,
    memo: &str,
) -> Vec<u8> {
    serde_json::to_vec(&FungibleTokenPacketData {
        denom: denom.to_owned(),
        amount: amount.to_owned(),
        sender: sender.to_owned(),
        receiver: receiver.to_owned(),
        memo: memo.to_owned(),
    })
    .unwrap()
}

/// A packet from osmosis (`transfer/channel-42` on its side) to the hub.
pub(crate) fn osmo_packet(sequence: u64, data: Vec<u8>) -> Packet {
    let hub = osmo_path();
    Packet {
        seq_on_a: Sequence::from(sequence),
        port_id_on_a: PortId::transfer(),
        chan_id_on_a: ChannelId::new(42),
        port_id_on_b: hub.port_id,
        chan_id_on_b: hub.channel_id,
        data,
        timeout_height_on_b: TimeoutHeight::Never,
        timeout_timestamp_on_b: Timestamp::none(),
    }
}

/// A packet the hub sent to osmosis.
pub(crate) fn hub_packet(sequence: u64, data: Vec<u8>) -> Packet {
    let hub = osmo_path();
    Packet {
        seq_on_a: Sequence::from(sequence),
        port_id_on_a: hub.port_id,
        chan_id_on_a: hub.channel_id,
        port_id_on_b: PortId::transfer(),
        chan_id_on_b: ChannelId::new(42),
        data,
        timeout_height_on_b: TimeoutHeight::Never,
        timeout_timestamp_on_b: Timestamp::none(),
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockNexus {
    chains: BTreeMap<String, Chain>,
    deactivated: BTreeSet<String>,
    native_assets: BTreeMap<String, ChainName>,
    assets: BTreeSet<(String, String)>,
    pub transfers: Vec<CrossChainTransfer>,
    pub messages: BTreeMap<String, GeneralMessage>,
    pub rate_limited: Vec<(ChainName, Coin, TransferDirection)>,
    pub rate_limit_exceeded: bool,
    pub invalid_addresses: BTreeSet<String>,
    message_nonce: u64,
    transfer_nonce: u64,
}

impl MockNexus {
    pub fn deactivate(&mut self, chain: &ChainName) {
        self.deactivated.insert(chain.to_key());
    }

    /// Records a pending transfer to `recipient` as if another module had routed it.
    pub fn add_pending_transfer(&mut self, recipient: CrossChainAddress, asset: Coin) -> TransferId {
        self.transfer_nonce += 1;
        let id = TransferId(self.transfer_nonce);
        self.transfers.push(CrossChainTransfer {
            id,
            recipient,
            asset,
            state: TransferState::Pending,
        });
        id
    }

    fn set_message_status(&mut self, id: &str, status: MessageStatus) -> Result<(), String> {
        let message = self
            .messages
            .get_mut(id)
            .ok_or_else(|| format!("message {id} not found"))?;
        message.status = status;
        Ok(())
    }
}

impl Nexus for MockNexus {
    type Error = String;

    fn get_chain(&self, chain: &ChainName) -> Option<Chain> {
        self.chains.get(&chain.to_key()).cloned()
    }

    fn set_chain(&mut self, chain: Chain) {
        self.chains.insert(chain.name.to_key(), chain);
    }

    fn is_chain_activated(&self, chain: &Chain) -> bool {
        !self.deactivated.contains(&chain.name.to_key())
    }

    fn get_chain_by_native_asset(&self, asset: &str) -> Option<Chain> {
        self.native_assets
            .get(asset)
            .and_then(|name| self.get_chain(name))
    }

    fn is_asset_registered(&self, chain: &Chain, asset: &str) -> bool {
        self.assets
            .contains(&(chain.name.to_key(), asset.to_owned()))
    }

    fn register_asset(&mut self, chain: &Chain, asset: &str, is_native: bool) -> Result<(), String> {
        if !self.assets.insert((chain.name.to_key(), asset.to_owned())) {
            return Err(format!("asset {asset} already registered on {}", chain.name));
        }
        if is_native {
            self.native_assets
                .insert(asset.to_owned(), chain.name.clone());
        }
        Ok(())
    }

    fn validate_address(&self, address: &CrossChainAddress) -> Result<(), String> {
        if address.address.is_empty() || self.invalid_addresses.contains(&address.address) {
            return Err(format!("invalid address {address}"));
        }
        Ok(())
    }

    fn enqueue_transfer(
        &mut self,
        _source: &Chain,
        recipient: CrossChainAddress,
        asset: Coin,
    ) -> Result<TransferId, String> {
        if self.rate_limit_exceeded {
            return Err("rate limit exceeded".to_owned());
        }
        Ok(self.add_pending_transfer(recipient, asset))
    }

    fn get_transfers_for_chain(
        &self,
        chain: &Chain,
        state: TransferState,
        limit: u64,
    ) -> Vec<CrossChainTransfer> {
        self.transfers
            .iter()
            .filter(|t| t.recipient.chain.name == chain.name && t.state == state)
            .take(limit as usize)
            .cloned()
            .collect()
    }

    fn archive_pending_transfer(&mut self, transfer: &CrossChainTransfer) {
        if let Some(t) = self.transfers.iter_mut().find(|t| t.id == transfer.id) {
            t.state = TransferState::Archived;
        }
    }

    fn rate_limit_transfer(
        &mut self,
        chain: &ChainName,
        asset: &Coin,
        direction: TransferDirection,
    ) -> Result<(), String> {
        if self.rate_limit_exceeded {
            return Err(format!("rate limit exceeded for {asset} on {chain}"));
        }
        self.rate_limited
            .push((chain.clone(), asset.clone(), direction));
        Ok(())
    }

    fn generate_message_id(&mut self) -> (String, [u8; 32], u64) {
        self.message_nonce += 1;
        let tx_id = [0xab; 32];
        (
            format!("0x{}-{}", hex::encode(tx_id), self.message_nonce),
            tx_id,
            self.message_nonce,
        )
    }

    fn set_new_message(&mut self, message: GeneralMessage) -> Result<(), String> {
        if self.messages.contains_key(&message.id) {
            return Err(format!("message {} already exists", message.id));
        }
        self.messages.insert(message.id.clone(), message);
        Ok(())
    }

    fn get_message(&self, id: &str) -> Option<GeneralMessage> {
        self.messages.get(id).cloned()
    }

    fn set_message_processing(&mut self, id: &str) -> Result<(), String> {
        match self.messages.get(id).map(|m| m.status) {
            Some(MessageStatus::Approved | MessageStatus::Failed) => {
                self.set_message_status(id, MessageStatus::Processing)
            }
            Some(status) => Err(format!("message {id} cannot be routed from {status:?}")),
            None => Err(format!("message {id} not found")),
        }
    }

    fn set_message_executed(&mut self, id: &str) -> Result<(), String> {
        self.set_message_status(id, MessageStatus::Executed)
    }

    fn set_message_failed(&mut self, id: &str) -> Result<(), String> {
        self.set_message_status(id, MessageStatus::Failed)
    }
}

#[derive(Debug, Default)]
struct IbcState {
    next_sequence: BTreeMap<String, u64>,
    client_height: u64,
    traces: BTreeMap<[u8; 32], DenomTrace>,
    sent_transfers: Vec<MsgTransfer>,
    sent_packets: Vec<Packet>,
    failing_receivers: BTreeSet<String>,
    panicking_receivers: BTreeSet<String>,
    recv_ack: Option<AcknowledgementStatus>,
    fail_callbacks: bool,
    callbacks: Vec<&'static str>,
}

/// Channel and transfer state shared by [`MockChannel`] and [`MockTransfer`], so that the
/// sequences they hand out agree.
#[derive(Clone, Debug, Default)]
pub(crate) struct MockIbc(Arc<RwLock<IbcState>>);

impl MockIbc {
    fn read(&self) -> std::sync::RwLockReadGuard<'_, IbcState> {
        self.0.read().unwrap()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, IbcState> {
        self.0.write().unwrap()
    }

    pub fn set_next_sequence(&self, path: &IbcPath, sequence: u64) {
        self.write()
            .next_sequence
            .insert(path.to_string(), sequence);
    }

    pub fn set_client_height(&self, height: u64) {
        self.write().client_height = height;
    }

    pub fn register_trace(&self, trace: DenomTrace) {
        self.write().traces.insert(trace.hash(), trace);
    }

    pub fn fail_sends_to(&self, receiver: &str) {
        self.write().failing_receivers.insert(receiver.to_owned());
    }

    pub fn panic_sends_to(&self, receiver: &str) {
        self.write()
            .panicking_receivers
            .insert(receiver.to_owned());
    }

    pub fn set_recv_ack(&self, ack: AcknowledgementStatus) {
        self.write().recv_ack = Some(ack);
    }

    pub fn fail_callbacks(&self) {
        self.write().fail_callbacks = true;
    }

    pub fn sent_transfers(&self) -> Vec<MsgTransfer> {
        self.read().sent_transfers.clone()
    }

    pub fn sent_packets(&self) -> Vec<Packet> {
        self.read().sent_packets.clone()
    }

    pub fn callbacks(&self) -> Vec<&'static str> {
        self.read().callbacks.clone()
    }

    fn callback(&self, name: &'static str) -> Result<(), String> {
        let mut state = self.write();
        if state.fail_callbacks {
            return Err(format!("{name} callback failed"));
        }
        state.callbacks.push(name);
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct MockChannel(pub MockIbc);

impl ChannelKeeper for MockChannel {
    type Error = String;

    fn get_next_sequence_send(&self, port_id: &PortId, channel_id: &ChannelId) -> Option<Sequence> {
        let path = IbcPath::new(port_id.clone(), channel_id.clone());
        self.0
            .read()
            .next_sequence
            .get(&path.to_string())
            .map(|seq| Sequence::from(*seq))
    }

    fn get_channel_client_latest_height(
        &self,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<Height, String> {
        Height::new(1, self.0.read().client_height).map_err(|e| e.to_string())
    }

    fn send_packet(&mut self, packet: &Packet) -> Result<(), String> {
        self.0.write().sent_packets.push(packet.clone());
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct MockTransfer(pub MockIbc);

impl IbcTransferKeeper for MockTransfer {
    type Error = String;

    fn get_denom_trace(&self, hash: &[u8; 32]) -> Option<DenomTrace> {
        self.0.read().traces.get(hash).cloned()
    }

    fn send_transfer(&mut self, msg: MsgTransfer) -> Result<Packet, String> {
        // no lock may be held while panicking
        let panics = self.0.read().panicking_receivers.contains(&msg.receiver);
        if panics {
            panic!("transfer to {} blew up", msg.receiver);
        }

        let mut state = self.0.write();
        if state.failing_receivers.contains(&msg.receiver) {
            return Err(format!("failed to send transfer to {}", msg.receiver));
        }
        let path = IbcPath::new(msg.port_id_on_a.clone(), msg.chan_id_on_a.clone());
        let next = state
            .next_sequence
            .get_mut(&path.to_string())
            .ok_or_else(|| format!("channel {path} not found"))?;
        let sequence = Sequence::from(*next);
        *next += 1;

        let data = serde_json::to_vec(&FungibleTokenPacketData {
            denom: msg.token.denom.to_string(),
            amount: msg.token.amount.to_string(),
            sender: msg.sender.to_string(),
            receiver: msg.receiver.clone(),
            memo: msg.memo.clone(),
        })
        .map_err(|e| e.to_string())?;
        let packet = Packet {
            seq_on_a: sequence,
            port_id_on_a: msg.port_id_on_a.clone(),
            chan_id_on_a: msg.chan_id_on_a.clone(),
            port_id_on_b: PortId::transfer(),
            chan_id_on_b: ChannelId::new(42),
            data,
            timeout_height_on_b: msg.timeout_height_on_b,
            timeout_timestamp_on_b: msg.timeout_timestamp_on_b,
        };
        state.sent_transfers.push(msg);
        Ok(packet)
    }

    fn on_recv_packet(&mut self, _packet: &Packet) -> AcknowledgementStatus {
        self.0.write().callbacks.push("recv");
        self.0
            .read()
            .recv_ack
            .clone()
            .unwrap_or_else(success_acknowledgement)
    }

    fn on_acknowledgement_packet(&mut self, _packet: &Packet, _ack: &[u8]) -> Result<(), String> {
        self.0.callback("ack")
    }

    fn on_timeout_packet(&mut self, _packet: &Packet) -> Result<(), String> {
        self.0.callback("timeout")
    }
}
