//! ICS-20 denomination traces and the `ibc/<HASH>` vouchers they map to.

use ibc::apps::transfer::types::error::TokenTransferError;
use ibc::apps::transfer::types::{is_receiver_chain_source, PrefixedDenom, TracePrefix};
use ibc::core::host::types::identifiers::{ChannelId, PortId};
use sha2::{Digest, Sha256};

use super::error::Error;

/// Prefix of ICS-20 voucher denominations.
pub const DENOM_PREFIX: &str = "ibc";

/// The `(trace path, base denom)` pair backing an ICS-20 voucher.
pub type DenomTrace = PrefixedDenom;

/// Splits a full denom like `transfer/channel-0/transfer/channel-7/uatom` into its trace
/// path and base denom.
pub fn parse_denom(full_denom: &str) -> Result<DenomTrace, Error> {
    full_denom
        .parse()
        .map_err(|e: TokenTransferError| Error::InvalidDenom {
            denom: full_denom.to_owned(),
            reason: e.to_string(),
        })
}

/// On-chain representation of a denom trace.
pub trait VoucherDenom {
    /// SHA-256 over the full denom path
    fn hash(&self) -> [u8; 32];

    /// `ibc/<HASH>` for vouchers, the base denom otherwise
    fn ibc_denom(&self) -> String;
}

impl VoucherDenom for PrefixedDenom {
    fn hash(&self) -> [u8; 32] {
        Sha256::digest(self.to_string().as_bytes()).into()
    }

    fn ibc_denom(&self) -> String {
        if self.trace_path.is_empty() {
            return self.base_denom.to_string();
        }
        format!("{DENOM_PREFIX}/{}", hex::encode_upper(self.hash()))
    }
}

/// Parses the hash out of an `ibc/<64 hex chars>` voucher denom.
pub fn parse_ibc_denom_hash(denom: &str) -> Option<[u8; 32]> {
    let hash = denom.strip_prefix(DENOM_PREFIX)?.strip_prefix('/')?;
    if hash.len() != 64 {
        return None;
    }
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(hash, &mut bytes).ok()?;
    Some(bytes)
}

pub fn is_ibc_denom(denom: &str) -> bool {
    parse_ibc_denom_hash(denom).is_some()
}

/// The denom a packet's tokens are credited under on the receiving chain. Tokens returning to
/// their source lose the sender's prefix, everything else gains the receiver's.
pub fn receiving_denom(
    (source_port, source_channel): (&PortId, &ChannelId),
    (dest_port, dest_channel): (&PortId, &ChannelId),
    denom: &str,
) -> Result<String, Error> {
    let mut trace = parse_denom(denom)?;
    if is_receiver_chain_source(source_port.clone(), source_channel.clone(), &trace) {
        trace.remove_trace_prefix(&TracePrefix::new(
            source_port.clone(),
            source_channel.clone(),
        ));
    } else {
        trace.add_trace_prefix(TracePrefix::new(dest_port.clone(), dest_channel.clone()));
    }
    Ok(trace.ibc_denom())
}
