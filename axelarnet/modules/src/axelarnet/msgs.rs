//! Module messages and their protobuf wire forms.

use core::str::FromStr;

use cosmrs::AccountId;
use ibc_proto::google::protobuf::Any;
use prost::Message;

use super::error::{AppError, Error};
use super::message_route::RoutingContext;
use super::nexus::{ChainName, TransferId};
use super::types::IbcPath;

pub const REGISTER_IBC_PATH_TYPE_URL: &str = "/axelar.axelarnet.v1beta1.RegisterIBCPathRequest";
pub const ADD_COSMOS_BASED_CHAIN_TYPE_URL: &str =
    "/axelar.axelarnet.v1beta1.AddCosmosBasedChainRequest";
pub const ROUTE_IBC_TRANSFERS_TYPE_URL: &str = "/axelar.axelarnet.v1beta1.RouteIBCTransfersRequest";
pub const RETRY_IBC_TRANSFER_TYPE_URL: &str = "/axelar.axelarnet.v1beta1.RetryIBCTransferRequest";
pub const REGISTER_ASSET_TYPE_URL: &str = "/axelar.axelarnet.v1beta1.RegisterAssetRequest";
pub const ROUTE_MESSAGE_TYPE_URL: &str = "/axelar.axelarnet.v1beta1.RouteMessageRequest";

#[derive(Clone, PartialEq, Message)]
pub struct RawRegisterIbcPathRequest {
    #[prost(string, tag = "1")]
    pub sender: String,
    #[prost(string, tag = "2")]
    pub chain: String,
    #[prost(string, tag = "3")]
    pub path: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct RawAddCosmosBasedChainRequest {
    #[prost(string, tag = "1")]
    pub sender: String,
    #[prost(string, tag = "2")]
    pub addr_prefix: String,
    #[prost(string, repeated, tag = "3")]
    pub native_assets: Vec<String>,
    #[prost(string, tag = "4")]
    pub cosmos_chain: String,
    #[prost(string, tag = "5")]
    pub ibc_path: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct RawRouteIbcTransfersRequest {
    #[prost(string, tag = "1")]
    pub sender: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct RawRetryIbcTransferRequest {
    #[prost(string, tag = "1")]
    pub sender: String,
    #[prost(string, tag = "2")]
    pub chain: String,
    #[prost(uint64, tag = "3")]
    pub id: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct RawAsset {
    #[prost(string, tag = "1")]
    pub denom: String,
    #[prost(bool, tag = "2")]
    pub is_native_asset: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct RawRegisterAssetRequest {
    #[prost(string, tag = "1")]
    pub sender: String,
    #[prost(string, tag = "2")]
    pub chain: String,
    #[prost(message, optional, tag = "3")]
    pub asset: Option<RawAsset>,
}

#[derive(Clone, PartialEq, Message)]
pub struct RawRouteMessageRequest {
    #[prost(string, tag = "1")]
    pub sender: String,
    #[prost(string, tag = "2")]
    pub id: String,
    /// empty when no payload is supplied
    #[prost(bytes = "vec", tag = "3")]
    pub payload: Vec<u8>,
}

/// A decoded, syntactically valid module message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AxelarnetMsg {
    RegisterIbcPath {
        chain: ChainName,
        path: IbcPath,
    },
    AddCosmosBasedChain {
        name: ChainName,
        addr_prefix: String,
        native_assets: Vec<String>,
        ibc_path: IbcPath,
    },
    RouteIbcTransfers,
    RetryIbcTransfer {
        chain: ChainName,
        id: TransferId,
    },
    RegisterAsset {
        chain: ChainName,
        denom: String,
        is_native: bool,
    },
    RouteMessage {
        id: String,
        ctx: RoutingContext,
    },
}

fn decode<M: Message + Default>(value: &[u8]) -> Result<M, Error> {
    M::decode(value).map_err(|e| Error::MsgDecodeFailure {
        reason: e.to_string(),
    })
}

fn decode_failure(reason: &str) -> Error {
    Error::MsgDecodeFailure {
        reason: reason.to_owned(),
    }
}

impl TryFrom<Any> for AxelarnetMsg {
    type Error = AppError;

    fn try_from(raw: Any) -> Result<Self, Self::Error> {
        let msg = match raw.type_url.as_str() {
            REGISTER_IBC_PATH_TYPE_URL => {
                let msg: RawRegisterIbcPathRequest = decode(&raw.value)?;
                Self::RegisterIbcPath {
                    chain: ChainName::new(msg.chain)?,
                    path: IbcPath::from_str(&msg.path)?,
                }
            }
            ADD_COSMOS_BASED_CHAIN_TYPE_URL => {
                let msg: RawAddCosmosBasedChainRequest = decode(&raw.value)?;
                if msg.addr_prefix.is_empty() {
                    return Err(decode_failure("empty address prefix").into());
                }
                Self::AddCosmosBasedChain {
                    name: ChainName::new(msg.cosmos_chain)?,
                    addr_prefix: msg.addr_prefix,
                    native_assets: msg.native_assets,
                    ibc_path: IbcPath::from_str(&msg.ibc_path)?,
                }
            }
            ROUTE_IBC_TRANSFERS_TYPE_URL => {
                let _: RawRouteIbcTransfersRequest = decode(&raw.value)?;
                Self::RouteIbcTransfers
            }
            RETRY_IBC_TRANSFER_TYPE_URL => {
                let msg: RawRetryIbcTransferRequest = decode(&raw.value)?;
                Self::RetryIbcTransfer {
                    chain: ChainName::new(msg.chain)?,
                    id: TransferId(msg.id),
                }
            }
            REGISTER_ASSET_TYPE_URL => {
                let msg: RawRegisterAssetRequest = decode(&raw.value)?;
                let asset = msg
                    .asset
                    .filter(|asset| !asset.denom.is_empty())
                    .ok_or_else(|| decode_failure("missing asset denom"))?;
                Self::RegisterAsset {
                    chain: ChainName::new(msg.chain)?,
                    denom: asset.denom,
                    is_native: asset.is_native_asset,
                }
            }
            ROUTE_MESSAGE_TYPE_URL => {
                let msg: RawRouteMessageRequest = decode(&raw.value)?;
                if msg.id.is_empty() {
                    return Err(decode_failure("empty message id").into());
                }
                let sender = msg
                    .sender
                    .parse::<AccountId>()
                    .map_err(|e| Error::InvalidAddress {
                        address: msg.sender.clone(),
                        reason: e.to_string(),
                    })?;
                Self::RouteMessage {
                    id: msg.id,
                    ctx: RoutingContext {
                        sender,
                        payload: (!msg.payload.is_empty()).then_some(msg.payload),
                    },
                }
            }
            _ => return Err(AppError::NotHandled),
        };
        Ok(msg)
    }
}

impl From<AxelarnetMsg> for Any {
    fn from(msg: AxelarnetMsg) -> Self {
        let (type_url, value) = match msg {
            AxelarnetMsg::RegisterIbcPath { chain, path } => (
                REGISTER_IBC_PATH_TYPE_URL,
                RawRegisterIbcPathRequest {
                    sender: String::new(),
                    chain: chain.to_string(),
                    path: path.to_string(),
                }
                .encode_to_vec(),
            ),
            AxelarnetMsg::AddCosmosBasedChain {
                name,
                addr_prefix,
                native_assets,
                ibc_path,
            } => (
                ADD_COSMOS_BASED_CHAIN_TYPE_URL,
                RawAddCosmosBasedChainRequest {
                    sender: String::new(),
                    addr_prefix,
                    native_assets,
                    cosmos_chain: name.to_string(),
                    ibc_path: ibc_path.to_string(),
                }
                .encode_to_vec(),
            ),
            AxelarnetMsg::RouteIbcTransfers => (
                ROUTE_IBC_TRANSFERS_TYPE_URL,
                RawRouteIbcTransfersRequest::default().encode_to_vec(),
            ),
            AxelarnetMsg::RetryIbcTransfer { chain, id } => (
                RETRY_IBC_TRANSFER_TYPE_URL,
                RawRetryIbcTransferRequest {
                    sender: String::new(),
                    chain: chain.to_string(),
                    id: id.0,
                }
                .encode_to_vec(),
            ),
            AxelarnetMsg::RegisterAsset {
                chain,
                denom,
                is_native,
            } => (
                REGISTER_ASSET_TYPE_URL,
                RawRegisterAssetRequest {
                    sender: String::new(),
                    chain: chain.to_string(),
                    asset: Some(RawAsset {
                        denom,
                        is_native_asset: is_native,
                    }),
                }
                .encode_to_vec(),
            ),
            AxelarnetMsg::RouteMessage { id, ctx } => (
                ROUTE_MESSAGE_TYPE_URL,
                RawRouteMessageRequest {
                    sender: ctx.sender.to_string(),
                    id,
                    payload: ctx.payload.unwrap_or_default(),
                }
                .encode_to_vec(),
            ),
        };
        Any {
            type_url: type_url.to_owned(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_register_ibc_path() {
        let any = Any {
            type_url: REGISTER_IBC_PATH_TYPE_URL.to_owned(),
            value: RawRegisterIbcPathRequest {
                sender: "axelar1gov".to_owned(),
                chain: "osmosis".to_owned(),
                path: "transfer/channel-7".to_owned(),
            }
            .encode_to_vec(),
        };

        let AxelarnetMsg::RegisterIbcPath { chain, path } = AxelarnetMsg::try_from(any).unwrap()
        else {
            panic!("wrong message");
        };
        assert_eq!(chain, ChainName::new("osmosis").unwrap());
        assert_eq!(path.to_string(), "transfer/channel-7");
    }

    #[test]
    fn unknown_type_urls_are_not_handled() {
        let any = Any {
            type_url: "/cosmos.bank.v1beta1.MsgSend".to_owned(),
            value: vec![],
        };
        assert!(matches!(
            AxelarnetMsg::try_from(any),
            Err(AppError::NotHandled)
        ));
    }

    #[test]
    fn malformed_messages_are_rejected() {
        let garbage = Any {
            type_url: RETRY_IBC_TRANSFER_TYPE_URL.to_owned(),
            value: vec![0xff, 0xff, 0xff],
        };
        assert!(matches!(
            AxelarnetMsg::try_from(garbage),
            Err(AppError::Axelarnet(Error::MsgDecodeFailure { .. }))
        ));

        let bad_path: Any = Any {
            type_url: REGISTER_IBC_PATH_TYPE_URL.to_owned(),
            value: RawRegisterIbcPathRequest {
                sender: String::new(),
                chain: "osmosis".to_owned(),
                path: "transfer".to_owned(),
            }
            .encode_to_vec(),
        };
        assert!(matches!(
            AxelarnetMsg::try_from(bad_path),
            Err(AppError::Axelarnet(Error::InvalidIbcPath { .. }))
        ));
    }

    #[test]
    fn messages_survive_the_wire() {
        let msg = AxelarnetMsg::AddCosmosBasedChain {
            name: ChainName::new("juno").unwrap(),
            addr_prefix: "juno".to_owned(),
            native_assets: vec!["ujuno".to_owned()],
            ibc_path: "transfer/channel-3".parse().unwrap(),
        };
        assert_eq!(AxelarnetMsg::try_from(Any::from(msg.clone())).unwrap(), msg);

        let msg = AxelarnetMsg::RouteMessage {
            id: "0xabc-1".to_owned(),
            ctx: RoutingContext {
                sender: AccountId::new("axelar", &[1; 20]).unwrap(),
                payload: Some(b"payload".to_vec()),
            },
        };
        assert_eq!(AxelarnetMsg::try_from(Any::from(msg.clone())).unwrap(), msg);
    }

    #[test]
    fn decodes_register_asset() {
        let any = Any {
            type_url: REGISTER_ASSET_TYPE_URL.to_owned(),
            value: RawRegisterAssetRequest {
                sender: "axelar1gov".to_owned(),
                chain: "osmosis".to_owned(),
                asset: Some(RawAsset {
                    denom: "uion".to_owned(),
                    is_native_asset: true,
                }),
            }
            .encode_to_vec(),
        };
        assert_eq!(
            AxelarnetMsg::try_from(any).unwrap(),
            AxelarnetMsg::RegisterAsset {
                chain: ChainName::new("osmosis").unwrap(),
                denom: "uion".to_owned(),
                is_native: true,
            }
        );

        let no_asset = Any {
            type_url: REGISTER_ASSET_TYPE_URL.to_owned(),
            value: RawRegisterAssetRequest {
                sender: String::new(),
                chain: "osmosis".to_owned(),
                asset: None,
            }
            .encode_to_vec(),
        };
        assert!(matches!(
            AxelarnetMsg::try_from(no_asset),
            Err(AppError::Axelarnet(Error::MsgDecodeFailure { .. }))
        ));
    }

    #[test]
    fn empty_route_payloads_are_absent() {
        let sender = AccountId::new("axelar", &[1; 20]).unwrap();
        let any = Any {
            type_url: ROUTE_MESSAGE_TYPE_URL.to_owned(),
            value: RawRouteMessageRequest {
                sender: sender.to_string(),
                id: "0xabc-1".to_owned(),
                payload: vec![],
            }
            .encode_to_vec(),
        };
        let AxelarnetMsg::RouteMessage { ctx, .. } = AxelarnetMsg::try_from(any).unwrap() else {
            panic!("wrong message");
        };
        assert_eq!(ctx.sender, sender);
        assert_eq!(ctx.payload, None);

        let bad_sender = Any {
            type_url: ROUTE_MESSAGE_TYPE_URL.to_owned(),
            value: RawRouteMessageRequest {
                sender: "not-bech32".to_owned(),
                id: "0xabc-1".to_owned(),
                payload: vec![1],
            }
            .encode_to_vec(),
        };
        assert!(matches!(
            AxelarnetMsg::try_from(bad_sender),
            Err(AppError::Axelarnet(Error::InvalidAddress { .. }))
        ));
    }
}
