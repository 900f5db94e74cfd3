//! The axelarnet gateway: bridges cosmos chains connected over ICS-20 into the cross-chain
//! nexus registry.
//!
//! Inbound packets may carry general messages in their memo, which are validated and
//! submitted to the registry. Transfers routed to cosmos chains are queued and sent by the
//! end blocker, and their acknowledgements and timeouts are reconciled against the transfer
//! records. Every packet crossing a registered path is accounted against the chain's rate
//! limit.

mod abci;
mod coin;
mod context;
mod denom;
mod error;
mod events;
mod genesis;
mod ibc_module;
mod ibc_transfer;
mod impls;
mod keeper;
mod message_handler;
mod message_route;
mod msg_server;
mod msgs;
mod nexus;
mod packet;
mod payload;
mod queue;
mod rate_limit;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use coin::*;
pub use context::*;
pub use denom::*;
pub use error::*;
pub use events::*;
pub use genesis::*;
pub use impls::*;
pub use keeper::*;
pub use message_handler::{Fee, Message, MessageType};
pub use message_route::RoutingContext;
pub use msgs::*;
pub use nexus::*;
pub use packet::*;
pub use payload::translate_message;
pub use queue::*;
pub use types::*;
