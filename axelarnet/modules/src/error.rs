use displaydoc::Display;

use crate::axelarnet::Error as AxelarnetError;
use crate::bank::Error as BankError;

#[derive(Debug, Display)]
pub enum Error {
    /// no module could handle specified message
    NotHandled,
    /// custom error: `{reason}`
    Custom { reason: String },
    /// bank module error: `{0}`
    Bank(BankError),
    /// axelarnet module error: `{0}`
    Axelarnet(AxelarnetError),
}
