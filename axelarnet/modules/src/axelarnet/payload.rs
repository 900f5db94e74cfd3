//! Translation of general message payloads into the memo a cosmos chain executes.
//!
//! Payloads arrive ABI-encoded as `(bytes32 version, bytes payload)`. The first four bytes of
//! the version select the format the destination expects:
//!
//! - `0`: a native message, handed over as JSON with the payload in base64
//! - `2`: a CosmWasm contract call, with the payload being the JSON execute message
//!
//! Version `1`, CosmWasm calls with ABI-typed arguments, is not supported.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use primitive_types::U256;
use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use super::error::Error;
use super::nexus::{CrossChainAddress, GeneralMessage};

const WORD: usize = 32;

const NATIVE_V1: u32 = 0;
const COSMWASM_V1: u32 = 1;
const COSMWASM_V2: u32 = 2;

const SOURCE_CHAIN: &str = "source_chain";
const SOURCE_ADDRESS: &str = "source_address";

fn invalid(reason: impl Into<String>) -> Error {
    Error::InvalidPayload {
        reason: reason.into(),
    }
}

#[derive(Serialize)]
struct NativeMessage<'a> {
    source_chain: &'a str,
    source_address: &'a str,
    payload: String,
    #[serde(rename = "type")]
    kind: i64,
}

#[derive(Serialize)]
struct ContractCall<'a> {
    source_chain: &'a str,
    source_address: &'a str,
    contract: &'a str,
    msg: &'a RawValue,
}

#[derive(Serialize)]
struct Wasm<'a> {
    wasm: ContractCall<'a>,
}

/// Builds the memo delivering `msg` to its cosmos recipient from the ABI-encoded `payload`.
pub fn translate_message(msg: &GeneralMessage, payload: &[u8]) -> Result<String, Error> {
    let (version, payload) = unpack_versioned_payload(payload)?;
    let version = u32::from_be_bytes([version[0], version[1], version[2], version[3]]);

    match version {
        NATIVE_V1 => native_message(msg, payload),
        COSMWASM_V2 => wasm_message(msg, payload),
        COSMWASM_V1 => Err(invalid("unsupported payload version 1")),
        _ => Err(invalid(format!("unknown payload version {version}"))),
    }
}

/// Splits an ABI-encoded `(bytes32, bytes)` tuple. Encodings that would not re-encode to the
/// exact same bytes are rejected.
fn unpack_versioned_payload(bz: &[u8]) -> Result<([u8; WORD], &[u8]), Error> {
    if bz.len() < 3 * WORD {
        return Err(invalid("payload is too short"));
    }

    let mut version = [0u8; WORD];
    version.copy_from_slice(&bz[..WORD]);

    if U256::from_big_endian(&bz[WORD..2 * WORD]) != U256::from(2 * WORD) {
        return Err(invalid("unexpected offset of the versioned payload"));
    }

    let data = &bz[3 * WORD..];
    let len = U256::from_big_endian(&bz[2 * WORD..3 * WORD]);
    if len > U256::from(data.len()) {
        return Err(invalid("payload is shorter than its declared length"));
    }
    let len = len.as_usize();

    let padded = (len + WORD - 1) / WORD * WORD;
    if data.len() != padded {
        return Err(invalid("payload length does not match its encoding"));
    }
    if data[len..].iter().any(|b| *b != 0) {
        return Err(invalid("non-zero payload padding"));
    }

    Ok((version, &data[..len]))
}

fn native_message(msg: &GeneralMessage, payload: &[u8]) -> Result<String, Error> {
    serde_json::to_string(&NativeMessage {
        source_chain: msg.sender.chain.name.as_str(),
        source_address: &msg.sender.address,
        payload: BASE64.encode(payload),
        kind: msg.message_type() as i64,
    })
    .map_err(|e| invalid(e.to_string()))
}

/// The payload must be a JSON object with a single key, the contract method, mapping to the
/// method's arguments. The payload text is forwarded untouched so numbers keep their
/// exact representation.
fn wasm_message(msg: &GeneralMessage, payload: &[u8]) -> Result<String, Error> {
    let execute: Map<String, Value> =
        serde_json::from_slice(payload).map_err(|e| invalid(e.to_string()))?;

    let mut methods = execute.values();
    let (Some(args), None) = (methods.next(), methods.next()) else {
        return Err(invalid("execute message must have exactly one method"));
    };
    let args = args
        .as_object()
        .ok_or_else(|| invalid("invalid arguments"))?;
    check_source_info(&msg.sender, args)?;

    let raw = core::str::from_utf8(payload).map_err(|e| invalid(e.to_string()))?;
    let raw: Box<RawValue> = serde_json::from_str(raw).map_err(|e| invalid(e.to_string()))?;

    serde_json::to_string(&Wasm {
        wasm: ContractCall {
            source_chain: msg.sender.chain.name.as_str(),
            source_address: &msg.sender.address,
            contract: &msg.recipient.address,
            msg: &raw,
        },
    })
    .map_err(|e| invalid(e.to_string()))
}

/// Source fields a contract call carries in its arguments must name the actual sender.
fn check_source_info(sender: &CrossChainAddress, args: &Map<String, Value>) -> Result<(), Error> {
    if let Some(chain) = args.get(SOURCE_CHAIN) {
        let chain = chain
            .as_str()
            .ok_or_else(|| invalid("source chain must have type string"))?;
        if !sender.chain.name.as_str().eq_ignore_ascii_case(chain) {
            return Err(invalid("source chain does not match expected"));
        }
    }

    if let Some(address) = args.get(SOURCE_ADDRESS) {
        let address = match address {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if !sender.address.eq_ignore_ascii_case(&address) {
            return Err(invalid("source address does not match expected"));
        }
    }

    Ok(())
}
