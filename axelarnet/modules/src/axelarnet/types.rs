use core::fmt::{Display, Formatter};
use core::str::FromStr;

use cosmrs::AccountId;
use ibc::core::host::types::identifiers::{ChannelId, PortId, Sequence};
use ibc_proto::cosmos::base::v1beta1::Coin as ProtoCoin;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::Error;
use super::nexus::{ChainName, TransferId, MODULE_NAME};
use crate::bank::Coin;

/// Denom of the hub's staking token.
pub const NATIVE_ASSET: &str = "uaxl";

/// Bech32 prefix of hub accounts.
pub const HUB_ADDRESS_PREFIX: &str = "axelar";

/// Deterministic per-denom account backing locked native and ICS-20 tokens.
pub fn escrow_address(denom: &str) -> AccountId {
    let hash = Sha256::digest(denom.as_bytes());
    AccountId::new(HUB_ADDRESS_PREFIX, &hash[..20]).unwrap() // safety - static prefix and 20-byte payload are always valid
}

/// Account custodying tokens attached to in-flight general messages.
pub fn gmp_account() -> AccountId {
    escrow_address(&format!("{MODULE_NAME}_gmp"))
}

/// Sender of transfers routed from the nexus registry to cosmos chains.
pub fn ibc_account() -> AccountId {
    escrow_address(&format!("{MODULE_NAME}_ibc"))
}

/// The module's own holding account, used to mint and burn externally registered assets.
pub fn module_account() -> AccountId {
    escrow_address(MODULE_NAME)
}

/// An IBC `port/channel` pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IbcPath {
    pub port_id: PortId,
    pub channel_id: ChannelId,
}

impl IbcPath {
    pub fn new(port_id: PortId, channel_id: ChannelId) -> Self {
        Self {
            port_id,
            channel_id,
        }
    }
}

impl Display for IbcPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.port_id, self.channel_id)
    }
}

impl FromStr for IbcPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| Error::InvalidIbcPath {
            path: s.to_owned(),
            reason,
        };

        let (port, channel) = s
            .split_once('/')
            .ok_or_else(|| invalid("expected <port>/<channel>".to_owned()))?;
        let port_id = PortId::from_str(port).map_err(|e| invalid(e.to_string()))?;
        let channel_id = ChannelId::from_str(channel).map_err(|e| invalid(e.to_string()))?;

        Ok(Self::new(port_id, channel_id))
    }
}

impl TryFrom<String> for IbcPath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IbcPath> for String {
    fn from(path: IbcPath) -> Self {
        path.to_string()
    }
}

/// Registry entry of a connected cosmos chain. The hub itself carries no path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosmosChain {
    pub name: ChainName,
    #[serde(default)]
    pub ibc_path: Option<IbcPath>,
    pub addr_prefix: String,
}

impl CosmosChain {
    pub fn validate_basic(&self) -> Result<(), Error> {
        let invalid = |reason: &str| Error::InvalidGenesis {
            reason: format!("cosmos chain {}: {reason}", self.name),
        };

        let is_hub = self.name.as_str().eq_ignore_ascii_case(super::nexus::HUB_CHAIN_NAME);
        match (&self.ibc_path, is_hub) {
            (Some(_), true) => return Err(invalid("the hub cannot have an IBC path")),
            (None, false) => return Err(invalid("missing IBC path")),
            _ => {}
        }
        if self.addr_prefix.is_empty() {
            return Err(invalid("empty address prefix"));
        }
        Ok(())
    }
}

/// Module parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Number of counterparty blocks after which an outbound transfer times out
    pub route_timeout_window: u64,
    /// Max pending registry transfers routed per chain and request
    pub transfer_limit: u64,
    /// Max queued transfers sent per block
    pub end_blocker_limit: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            route_timeout_window: 17_000,
            transfer_limit: 20,
            end_blocker_limit: 50,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("route_timeout_window", self.route_timeout_window),
            ("transfer_limit", self.transfer_limit),
            ("end_blocker_limit", self.end_blocker_limit),
        ] {
            if value == 0 {
                return Err(Error::InvalidParams {
                    reason: format!("{name} must be positive"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    Pending,
    Completed,
    Failed,
}

impl TransferStatus {
    fn as_raw(self) -> i32 {
        match self {
            Self::Pending => 1,
            Self::Completed => 2,
            Self::Failed => 3,
        }
    }
}

impl TryFrom<i32> for TransferStatus {
    type Error = Error;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(Self::Pending),
            2 => Ok(Self::Completed),
            3 => Ok(Self::Failed),
            _ => Err(Error::InvalidTransfer {
                reason: format!("non-existent transfer status {raw}"),
            }),
        }
    }
}

impl Display for TransferStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// An outbound transfer to a cosmos chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbcTransfer {
    pub id: TransferId,
    #[serde(with = "account_id")]
    pub sender: AccountId,
    pub receiver: String,
    pub token: Coin,
    pub port_id: PortId,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub sequence: Option<Sequence>,
    pub status: TransferStatus,
}

impl IbcTransfer {
    pub fn new(
        id: TransferId,
        sender: AccountId,
        receiver: String,
        token: Coin,
        port_id: PortId,
        channel_id: ChannelId,
    ) -> Self {
        Self {
            id,
            sender,
            receiver,
            token,
            port_id,
            channel_id,
            sequence: None,
            status: TransferStatus::Pending,
        }
    }

    pub fn path(&self) -> IbcPath {
        IbcPath::new(self.port_id.clone(), self.channel_id.clone())
    }

    pub fn validate_basic(&self) -> Result<(), Error> {
        let invalid = |reason: &str| Error::InvalidTransfer {
            reason: format!("transfer {}: {reason}", self.id),
        };

        if self.receiver.trim().is_empty() {
            return Err(invalid("empty receiver"));
        }
        if self.token.denom.as_str().is_empty() {
            return Err(invalid("empty token denom"));
        }
        if self.token.amount.is_zero() {
            return Err(invalid("token amount must be positive"));
        }
        Ok(())
    }

    /// Moves the transfer to `status`. `Completed` and `Failed` are only reachable from
    /// `Pending`; `Pending` only from `Failed`.
    pub fn set_status(&mut self, status: TransferStatus) -> Result<(), Error> {
        let allowed = matches!(
            (self.status, status),
            (TransferStatus::Pending, TransferStatus::Completed)
                | (TransferStatus::Pending, TransferStatus::Failed)
                | (TransferStatus::Failed, TransferStatus::Pending)
        );
        if !allowed {
            return Err(Error::InvalidStatusTransition {
                id: self.id.0,
                from: self.status.to_string(),
                to: status.to_string(),
            });
        }
        self.status = status;
        Ok(())
    }
}

/// Protobuf form of [`IbcTransfer`].
#[derive(Clone, PartialEq, prost::Message)]
pub struct RawIbcTransfer {
    #[prost(string, tag = "1")]
    pub sender: String,
    #[prost(string, tag = "2")]
    pub receiver: String,
    #[prost(message, optional, tag = "3")]
    pub token: Option<ProtoCoin>,
    #[prost(string, tag = "4")]
    pub port_id: String,
    #[prost(string, tag = "5")]
    pub channel_id: String,
    #[prost(uint64, tag = "6")]
    pub id: u64,
    #[prost(int32, tag = "7")]
    pub status: i32,
    /// zero until the transfer has been sent
    #[prost(uint64, tag = "8")]
    pub sequence: u64,
}

impl From<IbcTransfer> for RawIbcTransfer {
    fn from(value: IbcTransfer) -> Self {
        Self {
            sender: value.sender.to_string(),
            receiver: value.receiver,
            token: Some(value.token.into()),
            port_id: value.port_id.to_string(),
            channel_id: value.channel_id.to_string(),
            id: value.id.0,
            status: value.status.as_raw(),
            sequence: value.sequence.map(u64::from).unwrap_or_default(),
        }
    }
}

impl TryFrom<RawIbcTransfer> for IbcTransfer {
    type Error = Error;

    fn try_from(raw: RawIbcTransfer) -> Result<Self, Self::Error> {
        let invalid = |reason: String| Error::InvalidTransfer { reason };

        let sender = AccountId::from_str(&raw.sender).map_err(|e| Error::InvalidAddress {
            address: raw.sender.clone(),
            reason: e.to_string(),
        })?;
        let token = raw
            .token
            .ok_or_else(|| invalid("missing token".to_owned()))
            .and_then(|coin| Coin::try_from(coin).map_err(|e| invalid(e.to_string())))?;
        let port_id = PortId::from_str(&raw.port_id).map_err(|e| invalid(e.to_string()))?;
        let channel_id =
            ChannelId::from_str(&raw.channel_id).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            id: TransferId(raw.id),
            sender,
            receiver: raw.receiver,
            token,
            port_id,
            channel_id,
            sequence: (raw.sequence != 0).then(|| Sequence::from(raw.sequence)),
            status: raw.status.try_into()?,
        })
    }
}

/// Serde support for bech32 account ids as plain strings.
pub(super) mod account_id {
    use cosmrs::AccountId;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &AccountId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(id.as_ref())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AccountId, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
