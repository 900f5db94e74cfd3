use std::collections::BTreeSet;

use axelarnet_store::context::Store;
use axelarnet_store::impls::SharedStore;
use axelarnet_store::types::{Height, JsonStore};
use cosmrs::AccountId;
use primitive_types::U256;
use tracing::trace;

use super::context::BankKeeper;
use super::error::Error;
use super::util::{Balances, BalancesPath, Coin, Denom};

/// A bank keeper that keeps account balances as JSON in the shared store.
#[derive(Clone, Debug)]
pub struct BankBalanceKeeper<S> {
    balance_store: JsonStore<SharedStore<S>, BalancesPath, Balances>,
    blocked_addrs: BTreeSet<String>,
}

impl<S: Store> BankBalanceKeeper<S> {
    pub fn new(store: SharedStore<S>) -> Self {
        Self {
            balance_store: JsonStore::new(store),
            blocked_addrs: BTreeSet::new(),
        }
    }

    /// Marks `addrs` as blocked from receiving funds through user-facing transfers.
    pub fn with_blocked_addrs(mut self, addrs: impl IntoIterator<Item = AccountId>) -> Self {
        self.blocked_addrs
            .extend(addrs.into_iter().map(|addr| addr.to_string()));
        self
    }

    pub fn get_all_balances(&self, address: AccountId) -> Vec<Coin> {
        self.balance_store
            .get(Height::Pending, &BalancesPath(address))
            .map(|b| b.0)
            .unwrap_or_default()
    }

    fn set_balances(&mut self, address: AccountId, balances: Vec<Coin>) -> Result<(), Error> {
        self.balance_store
            .set(BalancesPath(address), Balances(balances))
            .map(|_| ())
            .map_err(|e| Error::Store {
                reason: format!("{e:?}"),
            })
    }
}

impl<S: Store> BankKeeper for BankBalanceKeeper<S> {
    type Error = Error;

    fn get_balance(&self, address: &AccountId, denom: &Denom) -> Coin {
        self.get_all_balances(address.clone())
            .into_iter()
            .find(|c| &c.denom == denom)
            .unwrap_or_else(|| Coin::new_empty(denom.clone()))
    }

    fn send_coins(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: impl IntoIterator<Item = Coin>,
    ) -> Result<(), Self::Error> {
        trace!("sending coins from {} to {}", from, to);

        let mut src_balances = self.get_all_balances(from.clone());
        let mut dst_balances = self.get_all_balances(to.clone());
        let self_transfer = from == to;

        for Coin { denom, amount } in amount {
            let src_balance = src_balances
                .iter_mut()
                .find(|c| c.denom == denom)
                .filter(|c| c.amount >= amount)
                .ok_or_else(|| Error::InsufficientSourceFunds {
                    account: from.clone(),
                    denom: denom.to_string(),
                })?;

            if self_transfer {
                continue;
            }

            let dst_balance = match dst_balances.iter().position(|c| c.denom == denom) {
                Some(i) => &mut dst_balances[i],
                None => {
                    dst_balances.push(Coin::new_empty(denom));
                    dst_balances.last_mut().unwrap() // safety - an element was just pushed
                }
            };

            if dst_balance.amount > U256::MAX - amount {
                return Err(Error::DestFundOverflow);
            }

            src_balance.amount -= amount;
            dst_balance.amount += amount;
        }

        if self_transfer {
            return Ok(());
        }

        // Store the updated account balances
        self.set_balances(from, src_balances)?;
        self.set_balances(to, dst_balances)
    }

    fn mint_coins(
        &mut self,
        account: AccountId,
        amount: impl IntoIterator<Item = Coin>,
    ) -> Result<(), Self::Error> {
        trace!("minting coins to {}", account);

        let mut balances = self.get_all_balances(account.clone());

        for Coin { denom, amount } in amount {
            let balance = match balances.iter().position(|c| c.denom == denom) {
                Some(i) => &mut balances[i],
                None => {
                    balances.push(Coin::new_empty(denom));
                    balances.last_mut().unwrap() // safety - an element was just pushed
                }
            };

            if balance.amount > U256::MAX - amount {
                return Err(Error::DestFundOverflow);
            }

            balance.amount += amount;
        }

        self.set_balances(account, balances)
    }

    fn burn_coins(
        &mut self,
        account: AccountId,
        amount: impl IntoIterator<Item = Coin>,
    ) -> Result<(), Self::Error> {
        trace!("burning coins from {}", account);

        let mut balances = self.get_all_balances(account.clone());

        for Coin { denom, amount } in amount {
            let balance = balances
                .iter_mut()
                .find(|c| c.denom == denom)
                .filter(|c| c.amount >= amount)
                .ok_or_else(|| Error::InsufficientSourceFunds {
                    account: account.clone(),
                    denom: denom.to_string(),
                })?;

            balance.amount -= amount;
        }

        self.set_balances(account, balances)
    }

    fn blocked_addr(&self, address: &AccountId) -> bool {
        self.blocked_addrs.contains(address.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use axelarnet_store::impls::InMemoryStore;

    use super::*;

    fn account(seed: u8) -> AccountId {
        AccountId::new("axelar", &[seed; 20]).unwrap()
    }

    fn keeper() -> BankBalanceKeeper<InMemoryStore> {
        BankBalanceKeeper::new(SharedStore::new(InMemoryStore::default()))
    }

    #[test]
    fn send_moves_funds_between_accounts() {
        let mut bank = keeper();
        bank.mint_coins(account(1), [Coin::new("uaxl", 100u64)])
            .unwrap();
        bank.send_coins(account(1), account(2), [Coin::new("uaxl", 40u64)])
            .unwrap();

        let denom = Denom::from("uaxl");
        assert_eq!(bank.get_balance(&account(1), &denom).amount, 60u64.into());
        assert_eq!(bank.get_balance(&account(2), &denom).amount, 40u64.into());
    }

    #[test]
    fn send_fails_without_funds_and_leaves_balances_untouched() {
        let mut bank = keeper();
        bank.mint_coins(account(1), [Coin::new("uaxl", 10u64)])
            .unwrap();
        let err = bank
            .send_coins(account(1), account(2), [Coin::new("uaxl", 11u64)])
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientSourceFunds { .. }));

        let denom = Denom::from("uaxl");
        assert_eq!(bank.get_balance(&account(1), &denom).amount, 10u64.into());
        assert!(bank.get_balance(&account(2), &denom).amount.is_zero());
    }

    #[test]
    fn burn_reduces_supply_held_by_account() {
        let mut bank = keeper();
        bank.mint_coins(account(3), [Coin::new("uusdc", 5u64)])
            .unwrap();
        bank.burn_coins(account(3), [Coin::new("uusdc", 5u64)])
            .unwrap();
        assert!(bank
            .get_balance(&account(3), &Denom::from("uusdc"))
            .amount
            .is_zero());
        assert!(bank
            .burn_coins(account(3), [Coin::new("uusdc", 1u64)])
            .is_err());
    }

    #[test]
    fn blocked_addresses_are_reported() {
        let bank = keeper().with_blocked_addrs([account(9)]);
        assert!(bank.blocked_addr(&account(9)));
        assert!(!bank.blocked_addr(&account(1)));
    }
}
