//! Background persistence of cart snapshots.
//!
//! Every cart mutation hands its resulting snapshot to a [`PersistQueue`].
//! The queue has depth one: a single background task writes whatever the
//! newest snapshot is, and snapshots submitted while a write is in flight
//! replace each other. The persisted slot therefore always converges on the
//! last mutation, and writes can never land out of order.

use std::collections::HashSet;
use std::sync::Arc;

use go_marketplace_core::CartItem;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use crate::error::{CartError, Result};
use crate::storage::KeyValueStore;

/// An immutable cart state tagged with its position in the mutation order.
#[derive(Debug, Clone)]
struct Snapshot {
    version: u64,
    items: Arc<[CartItem]>,
}

/// Depth-1, latest-wins write queue backed by a single worker task.
#[derive(Debug)]
pub struct PersistQueue {
    pending: watch::Sender<Snapshot>,
    settled: watch::Receiver<u64>,
    worker: JoinHandle<()>,
}

impl PersistQueue {
    /// Spawn the worker for `key`.
    ///
    /// `initial` is the state already in storage (the hydrated cart) and is
    /// not written again.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S: KeyValueStore>(
        storage: Arc<S>,
        key: impl Into<String>,
        initial: Arc<[CartItem]>,
    ) -> Self {
        let (pending, rx) = watch::channel(Snapshot {
            version: 0,
            items: initial,
        });
        let (settled_tx, settled) = watch::channel(0);
        let worker = tokio::spawn(run_worker(storage, key.into(), rx, settled_tx));

        Self {
            pending,
            settled,
            worker,
        }
    }

    /// Queue `items` for writing, superseding any snapshot not yet written.
    ///
    /// Returns the version assigned to the snapshot. Callers must submit in
    /// mutation order.
    pub fn submit(&self, items: Arc<[CartItem]>) -> u64 {
        let mut version = 0;
        self.pending.send_modify(|snapshot| {
            snapshot.version += 1;
            snapshot.items = items;
            version = snapshot.version;
        });
        version
    }

    /// Version of the most recent submitted snapshot.
    #[must_use]
    pub fn latest_version(&self) -> u64 {
        self.pending.borrow().version
    }

    /// Highest version the worker has finished with, whether the write
    /// succeeded or was reported as failed.
    #[must_use]
    pub fn settled_version(&self) -> u64 {
        *self.settled.borrow()
    }

    /// Wait until every snapshot submitted so far has settled.
    pub async fn flush(&self) {
        let target = self.latest_version();
        let mut settled = self.settled.clone();
        if settled.wait_for(|version| *version >= target).await.is_err() {
            warn!(target, "Persistence worker stopped before flush completed");
        }
    }

    /// Stop accepting snapshots and wait for the final one to be written.
    pub async fn close(self) {
        drop(self.pending);
        if let Err(e) = self.worker.await {
            error!(error = %e, "Persistence worker panicked");
        }
    }
}

#[instrument(skip_all, fields(key = %key))]
async fn run_worker<S: KeyValueStore>(
    storage: Arc<S>,
    key: String,
    mut pending: watch::Receiver<Snapshot>,
    settled: watch::Sender<u64>,
) {
    debug!("Persistence worker started");

    // `changed` still yields an unseen snapshot after the sender is dropped,
    // so the final state is written before the loop exits.
    while pending.changed().await.is_ok() {
        let snapshot = pending.borrow_and_update().clone();

        match write_snapshot(storage.as_ref(), &key, &snapshot.items).await {
            Ok(bytes) => {
                debug!(version = snapshot.version, bytes, lines = snapshot.items.len(), "Persisted cart");
            }
            Err(e) => crate::error::report(&e),
        }

        settled.send_replace(snapshot.version);
    }

    debug!("Persistence worker stopped");
}

async fn write_snapshot<S: KeyValueStore>(
    storage: &S,
    key: &str,
    items: &[CartItem],
) -> Result<usize> {
    let bytes = encode(items)?;
    let len = bytes.len();
    storage.set(key, bytes).await?;
    Ok(len)
}

/// Read and decode the snapshot stored under `key`.
///
/// # Errors
///
/// Returns `CartError::Persistence` if the read fails, or a decode error if
/// the stored bytes are not a valid cart.
pub async fn load<S: KeyValueStore>(storage: &S, key: &str) -> Result<Option<Vec<CartItem>>> {
    match storage.get(key).await? {
        Some(bytes) => decode(&bytes).map(Some),
        None => Ok(None),
    }
}

/// Serialize cart lines to the persisted JSON format.
///
/// # Errors
///
/// Returns `CartError::Serialization` if encoding fails.
pub fn encode(items: &[CartItem]) -> Result<Vec<u8>> {
    serde_json::to_vec(items).map_err(CartError::Serialization)
}

/// Parse the persisted JSON format, rejecting snapshots with duplicate ids.
///
/// # Errors
///
/// Returns `CartError::Deserialization` for malformed JSON or invalid fields
/// (such as a zero quantity), and `CartError::InvalidSnapshot` for duplicate
/// ids.
pub fn decode(bytes: &[u8]) -> Result<Vec<CartItem>> {
    let items: Vec<CartItem> = serde_json::from_slice(bytes).map_err(CartError::Deserialization)?;

    let mut seen = HashSet::with_capacity(items.len());
    for item in &items {
        if !seen.insert(&item.id) {
            return Err(CartError::InvalidSnapshot(format!("duplicate id {}", item.id)));
        }
    }

    Ok(items)
}
