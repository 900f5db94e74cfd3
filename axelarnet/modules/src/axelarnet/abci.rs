use std::any::Any;
use std::fmt::Debug;
use std::panic::{catch_unwind, AssertUnwindSafe};

use axelarnet_store::context::SavepointStore;
use tracing::{debug, error, info};

use super::context::{ChannelKeeper, IbcTransferKeeper, Nexus};
use super::error::Error;
use super::impls::Axelarnet;
use super::types::IbcTransfer;
use crate::bank::BankKeeper;

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}

impl<S, N, B, C, T> Axelarnet<S, N, B, C, T>
where
    S: SavepointStore + Debug,
    N: Nexus,
    B: BankKeeper,
    C: ChannelKeeper,
    T: IbcTransferKeeper,
{
    /// Drains up to `end_blocker_limit` transfers from the route queue and sends them.
    ///
    /// Each item runs behind its own store savepoint: a failing or panicking send is rolled
    /// back and the transfer marked failed, without affecting the other items. Dequeued items
    /// are never re-queued. Returns the number of items processed.
    pub fn end_blocker(&mut self) -> u64 {
        let limit = self.keeper.get_params().end_blocker_limit;
        let mut queue = self.keeper.transfer_queue();
        let mut count = 0;

        while count < limit && !queue.is_empty() {
            count += 1;

            let transfer = match queue.dequeue() {
                Ok(Some(transfer)) => transfer,
                Ok(None) => break,
                Err(e) => {
                    error!("failed to dequeue transfer: {}", e);
                    continue;
                }
            };
            let id = transfer.id;

            if let Err(e) = self.atomically(|app| app.send_recovering(transfer)) {
                error!("failed to send IBC transfer {}: {}", id, e);

                match self.keeper.set_transfer_failed(id) {
                    Ok(()) => info!("transfer {} marked as failed", id),
                    Err(e) => error!("failed to mark transfer {} as failed: {}", id, e),
                }
            }
        }

        if count > 0 {
            debug!("end blocker processed {} queued transfers", count);
        }
        count
    }

    fn send_recovering(&mut self, transfer: IbcTransfer) -> Result<(), Error> {
        catch_unwind(AssertUnwindSafe(|| self.send_ibc_transfer(transfer))).unwrap_or_else(
            |payload| {
                Err(Error::Panic {
                    reason: panic_reason(payload),
                })
            },
        )
    }
}
