use axelarnet_modules::axelarnet::{AxelarnetMsg, ChainName, GenesisState, IbcPath, TransferId};
use axelarnet_modules::error::Error;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ibc_proto::google::protobuf::Any;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::cli::command::{Commands, GenesisCmd, MsgCmd};
use crate::config::Config;

/// Executes `command`, returning what should be printed.
pub fn run(command: &Commands, cfg: &Config) -> Result<String, Error> {
    match command {
        Commands::Genesis(GenesisCmd::Default) => {
            let genesis = GenesisState {
                params: cfg.axelarnet.clone(),
                ..GenesisState::default()
            };
            to_json(&genesis)
        }
        Commands::Genesis(GenesisCmd::Validate { file }) => {
            let raw = std::fs::read_to_string(file).map_err(|e| Error::Custom {
                reason: format!("failed to read {}: {e}", file.display()),
            })?;
            let genesis = parse_genesis(&raw)?;
            genesis.validate()?;
            info!("validated genesis file {}", file.display());
            Ok(format!(
                "valid genesis: {} chains, {} transfers, {} queued",
                genesis.chains.len(),
                genesis.ibc_transfers.len(),
                genesis.transfer_queue.items.len()
            ))
        }
        Commands::Msg(cmd) => {
            let msg = build_msg(cmd)?;
            debug!("encoding {:?}", msg);
            let any = Any::from(msg);
            to_json(&json!({
                "type_url": any.type_url,
                "value": BASE64.encode(any.value),
            }))
        }
    }
}

/// Accepts either the module state or an app state holding it under `axelarnet`.
fn parse_genesis(raw: &str) -> Result<GenesisState, Error> {
    let value: Value = serde_json::from_str(raw).map_err(|e| Error::Custom {
        reason: format!("invalid genesis JSON: {e}"),
    })?;
    let state = match value.get("axelarnet") {
        Some(state) => state.clone(),
        None => value,
    };
    serde_json::from_value(state).map_err(|e| Error::Custom {
        reason: format!("invalid axelarnet genesis state: {e}"),
    })
}

fn build_msg(cmd: &MsgCmd) -> Result<AxelarnetMsg, Error> {
    let msg = match cmd {
        MsgCmd::RegisterIbcPath { chain, path } => AxelarnetMsg::RegisterIbcPath {
            chain: ChainName::new(chain.as_str())?,
            path: path.parse::<IbcPath>()?,
        },
        MsgCmd::AddCosmosBasedChain {
            name,
            addr_prefix,
            native_assets,
            path,
        } => AxelarnetMsg::AddCosmosBasedChain {
            name: ChainName::new(name.as_str())?,
            addr_prefix: addr_prefix.clone(),
            native_assets: native_assets.clone(),
            ibc_path: path.parse::<IbcPath>()?,
        },
        MsgCmd::RouteIbcTransfers => AxelarnetMsg::RouteIbcTransfers,
        MsgCmd::RetryIbcTransfer { chain, id } => AxelarnetMsg::RetryIbcTransfer {
            chain: ChainName::new(chain.as_str())?,
            id: TransferId(*id),
        },
        MsgCmd::RegisterAsset {
            chain,
            denom,
            native,
        } => AxelarnetMsg::RegisterAsset {
            chain: ChainName::new(chain.as_str())?,
            denom: denom.clone(),
            is_native: *native,
        },
    };
    Ok(msg)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, Error> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Custom {
        reason: e.to_string(),
    })
}
