use displaydoc::Display;

pub use crate::error::Error as AppError;

#[derive(Debug, Display)]
pub enum Error {
    /// general message error: `{reason}`
    GeneralMessage { reason: String },
    /// invalid chain name `{name}`: `{reason}`
    InvalidChainName { name: String, reason: String },
    /// `{chain}` is not a registered chain
    UnknownChain { chain: String },
    /// chain `{chain}` is already registered
    ChainAlreadyRegistered { chain: String },
    /// `{chain}` is not a registered cosmos chain
    UnknownCosmosChain { chain: String },
    /// chain `{chain}` registered for IBC path `{path}` is deactivated
    ChainDeactivated { chain: String, path: String },
    /// chain `{chain}` is not activated
    ChainNotActivated { chain: String },
    /// no chain is registered for IBC path `{path}`
    UnknownIbcPath { path: String },
    /// invalid IBC path `{path}`: `{reason}`
    InvalidIbcPath { path: String, reason: String },
    /// IBC path `{path}` is already registered for chain `{chain}`
    IbcPathTaken { path: String, chain: String },
    /// chain `{chain}` already has IBC path `{path}`
    IbcPathAlreadySet { chain: String, path: String },
    /// no IBC path found for chain `{chain}`
    IbcPathNotFound { chain: String },
    /// invalid address `{address}`: `{reason}`
    InvalidAddress { address: String, reason: String },
    /// unrecognized token `{denom}`
    UnrecognizedToken { denom: String },
    /// asset `{denom}` is not linked to a cosmos chain
    AssetNotLinked { denom: String },
    /// asset `{denom}` is not registered on chain `{chain}`
    AssetNotRegistered { denom: String, chain: String },
    /// denom trace path `{trace_path}` does not match path `{registered}` registered for `{denom}`
    PathMismatch {
        denom: String,
        trace_path: String,
        registered: String,
    },
    /// invalid denom `{denom}`: `{reason}`
    InvalidDenom { denom: String, reason: String },
    /// denom trace not found for `{denom}`
    DenomTraceNotFound { denom: String },
    /// cannot unmarshal ICS-20 transfer packet data: `{reason}`
    InvalidPacketData { reason: String },
    /// invalid acknowledgement: `{reason}`
    InvalidAcknowledgement { reason: String },
    /// unable to parse transfer amount `{amount}`
    InvalidAmount { amount: String },
    /// amount must be strictly positive, got `{amount}`
    NonPositiveAmount { amount: String },
    /// invalid fee: `{reason}`
    InvalidFee { reason: String },
    /// invalid payload: `{reason}`
    InvalidPayload { reason: String },
    /// unrecognized Message type `{kind}`
    UnrecognizedMessageType { kind: i64 },
    /// destination chain `{chain}` is not an EVM chain
    NonEvmDestination { chain: String },
    /// invalid transfer: `{reason}`
    InvalidTransfer { reason: String },
    /// transfer `{id}` not found
    TransferNotFound { id: u64 },
    /// transfer `{id}` cannot move from `{from}` to `{to}`
    InvalidStatusTransition { id: u64, from: String, to: String },
    /// sequence mapping already set for `{port}/{channel}/{sequence}`
    MappingAlreadySet {
        port: String,
        channel: String,
        sequence: u64,
    },
    /// next sequence send not found for `{port}/{channel}`
    NextSequenceNotFound { port: String, channel: String },
    /// invalid queue state: `{reason}`
    InvalidQueueState { reason: String },
    /// invalid genesis state: `{reason}`
    InvalidGenesis { reason: String },
    /// invalid params: `{reason}`
    InvalidParams { reason: String },
    /// failed to decode message: `{reason}`
    MsgDecodeFailure { reason: String },
    /// recovered from panic: `{reason}`
    Panic { reason: String },
    /// nexus error: `{reason}`
    Nexus { reason: String },
    /// channel error: `{reason}`
    Channel { reason: String },
    /// IBC transfer error: `{reason}`
    Transfer { reason: String },
    /// bank error: `{reason}`
    Bank { reason: String },
    /// Store error: `{reason}`
    Store { reason: String },
}

impl Error {
    pub(super) fn nexus(e: impl core::fmt::Display) -> Self {
        Self::Nexus {
            reason: e.to_string(),
        }
    }

    pub(super) fn channel(e: impl core::fmt::Display) -> Self {
        Self::Channel {
            reason: e.to_string(),
        }
    }

    pub(super) fn transfer(e: impl core::fmt::Display) -> Self {
        Self::Transfer {
            reason: e.to_string(),
        }
    }

    pub(super) fn bank(e: impl core::fmt::Display) -> Self {
        Self::Bank {
            reason: e.to_string(),
        }
    }

    pub(super) fn store(e: impl core::fmt::Debug) -> Self {
        Self::Store {
            reason: format!("{e:?}"),
        }
    }
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        AppError::Axelarnet(e)
    }
}
