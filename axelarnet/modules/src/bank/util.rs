use core::fmt::{Display, Formatter};

use axelarnet_store::types::Path;
use cosmrs::AccountId;
use ibc_proto::cosmos::base::v1beta1::Coin as ProtoCoin;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::error::Error;

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, Hash, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Denom(pub String);

impl Denom {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Denom {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Denom {
    fn from(denom: &str) -> Self {
        Self(denom.to_owned())
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct Coin {
    pub denom: Denom,
    pub amount: U256,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<U256>) -> Self {
        Self {
            denom: Denom(denom.into()),
            amount: amount.into(),
        }
    }

    pub fn new_empty(denom: Denom) -> Self {
        Self {
            denom,
            amount: 0u64.into(),
        }
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl TryFrom<ProtoCoin> for Coin {
    type Error = Error;

    fn try_from(raw: ProtoCoin) -> Result<Self, Self::Error> {
        if raw.denom.is_empty() {
            return Err(Error::InvalidCoin {
                reason: "empty denom".to_owned(),
            });
        }

        let amount = U256::from_dec_str(&raw.amount).map_err(|e| Error::InvalidCoin {
            reason: format!("invalid amount `{}`: {e:?}", raw.amount),
        })?;

        Ok(Self {
            denom: Denom(raw.denom),
            amount,
        })
    }
}

impl From<Coin> for ProtoCoin {
    fn from(value: Coin) -> Self {
        Self {
            denom: value.denom.0,
            amount: value.amount.to_string(),
        }
    }
}

impl From<(Denom, U256)> for Coin {
    fn from((denom, amount): (Denom, U256)) -> Self {
        Self { denom, amount }
    }
}

/// A mapping of currency denomination identifiers to balances.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(transparent)]
pub struct Balances(pub Vec<Coin>);

#[derive(Clone, Debug, derive_more::Display)]
pub(super) struct BalancesPath(pub AccountId);

impl From<BalancesPath> for Path {
    fn from(path: BalancesPath) -> Self {
        format!("balances/{}", path.0).try_into().unwrap() // safety - cannot fail as BalancesPath is correct-by-construction
    }
}
