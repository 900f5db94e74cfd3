//! Types shared with the nexus registry, the external chain/asset/transfer bookkeeping module.

use core::fmt::{Display, Formatter};
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::Error;
use crate::bank::Coin;

/// Name of the hub chain as registered in the nexus registry.
pub const HUB_CHAIN_NAME: &str = "Axelarnet";

/// Module name of this gateway; cosmos chains registered through it carry this module tag.
pub const MODULE_NAME: &str = "axelarnet";

/// Module tag of EVM-compatible chains.
pub const EVM_MODULE: &str = "evm";

const CHAIN_NAME_MAX_LENGTH: usize = 20;

/// A case-insensitive chain name.
#[derive(Clone, Debug, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainName(String);

impl ChainName {
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        let invalid = |reason: &str| Error::InvalidChainName {
            name: name.clone(),
            reason: reason.to_owned(),
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.len() > CHAIN_NAME_MAX_LENGTH {
            return Err(invalid("name is too long"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid("name contains invalid characters"));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical form used for store keys.
    pub fn to_key(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl PartialEq for ChainName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Display for ChainName {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ChainName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ChainName> for String {
    fn from(name: ChainName) -> Self {
        name.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub name: ChainName,
    pub module: String,
    pub supports_foreign_assets: bool,
}

impl Chain {
    /// The hub chain itself.
    pub fn hub() -> Self {
        Self {
            name: ChainName(HUB_CHAIN_NAME.to_owned()),
            module: MODULE_NAME.to_owned(),
            supports_foreign_assets: true,
        }
    }

    pub fn is_hub(&self) -> bool {
        self.name.as_str().eq_ignore_ascii_case(HUB_CHAIN_NAME)
    }

    pub fn is_from(&self, module: &str) -> bool {
        self.module == module
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrossChainAddress {
    pub chain: Chain,
    pub address: String,
}

impl Display for CrossChainAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.chain.name, self.address)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(pub u64);

impl Display for TransferId {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferDirection {
    /// Value entering the hub
    Incoming,
    /// Value leaving the hub
    Outgoing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferState {
    Pending,
    Archived,
}

/// A transfer recorded by the nexus registry, destined to a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrossChainTransfer {
    pub id: TransferId,
    pub recipient: CrossChainAddress,
    pub asset: Coin,
    pub state: TransferState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageStatus {
    Approved,
    Processing,
    Sent,
    Executed,
    Failed,
}

/// Kind of a general message, numbered as in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneralMessageType {
    /// A pure message
    General = 1,
    /// A message carrying tokens
    WithToken = 2,
}

/// The canonical cross-chain instruction submitted to the nexus registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneralMessage {
    pub id: String,
    pub sender: CrossChainAddress,
    pub recipient: CrossChainAddress,
    pub payload_hash: [u8; 32],
    pub status: MessageStatus,
    pub asset: Option<Coin>,
    pub source_tx_id: [u8; 32],
    pub source_tx_index: u64,
}

impl GeneralMessage {
    pub fn new(
        id: String,
        sender: CrossChainAddress,
        recipient: CrossChainAddress,
        payload_hash: [u8; 32],
        (source_tx_id, source_tx_index): ([u8; 32], u64),
        asset: Option<Coin>,
    ) -> Self {
        Self {
            id,
            sender,
            recipient,
            payload_hash,
            status: MessageStatus::Approved,
            asset,
            source_tx_id,
            source_tx_index,
        }
    }

    pub fn message_type(&self) -> GeneralMessageType {
        match self.asset {
            Some(_) => GeneralMessageType::WithToken,
            None => GeneralMessageType::General,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_names_compare_case_insensitively() {
        let a = ChainName::new("Ethereum").unwrap();
        let b: ChainName = "ethereum".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_key(), "ethereum");
        assert_eq!(a.to_string(), "Ethereum");
    }

    #[test]
    fn invalid_chain_names_are_rejected() {
        assert!(ChainName::new("").is_err());
        assert!(ChainName::new("a-chain-name-that-is-way-too-long").is_err());
        assert!(ChainName::new("bad chain").is_err());
        assert!(ChainName::new("bad/chain").is_err());
    }

    #[test]
    fn hub_chain_is_recognised() {
        assert!(Chain::hub().is_hub());
        assert!(Chain::hub().is_from(MODULE_NAME));
    }
}
