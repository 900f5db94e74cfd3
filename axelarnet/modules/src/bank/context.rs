use core::fmt::Display;

use cosmrs::AccountId;

use super::util::{Coin, Denom};

/// Bank capabilities required by the gateway: balance queries, transfers, supply changes and
/// the blocked-address check.
pub trait BankKeeper {
    type Error: Display;

    /// Return the balance of `denom` held by `address` (zero if none)
    fn get_balance(&self, address: &AccountId, denom: &Denom) -> Coin;

    /// This function should enable sending fungible tokens from one account to another
    fn send_coins(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: impl IntoIterator<Item = Coin>,
    ) -> Result<(), Self::Error>;

    /// This function to enable minting tokens to an account
    fn mint_coins(
        &mut self,
        account: AccountId,
        amount: impl IntoIterator<Item = Coin>,
    ) -> Result<(), Self::Error>;

    /// This function should enable burning of minted tokens in an account
    fn burn_coins(
        &mut self,
        account: AccountId,
        amount: impl IntoIterator<Item = Coin>,
    ) -> Result<(), Self::Error>;

    /// Whether `address` is barred from receiving funds through user-facing transfers
    fn blocked_addr(&self, address: &AccountId) -> bool;
}
