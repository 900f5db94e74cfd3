use cosmrs::AccountId;
pub use displaydoc::Display;

pub use crate::error::Error as AppError;

#[derive(Debug, Display)]
pub enum Error {
    /// invalid coin: `{reason}`
    InvalidCoin { reason: String },
    /// insufficient `{denom}` funds in account `{account}`
    InsufficientSourceFunds { account: AccountId, denom: String },
    /// receiver account funds overflow
    DestFundOverflow,
    /// Store error: `{reason}`
    Store { reason: String },
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        AppError::Bank(e)
    }
}
