//! Connection slot table
//!
//! A fixed number of slots bounds how many clients are served at once. The
//! supervisor claims and releases slots; each worker marks its own slot
//! Working and then Stopped.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Lifecycle of a slot: Empty -> New -> Working -> Stopped -> Empty.
/// `Finished` is entered once, during shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// Free for a new connection
    Empty,
    /// Claimed by the supervisor, worker not started yet
    New,
    /// Worker is serving the connection
    Working,
    /// Worker is done, waiting for housekeeping
    Stopped,
    /// Server is shutting down
    Finished,
}

impl SlotStatus {
    /// Whether a slot in this state may move to `next`.
    pub fn can_become(self, next: SlotStatus) -> bool {
        use SlotStatus::*;

        match (self, next) {
            (Finished, _) => false,
            (_, Finished) => true,
            (Empty, New) | (New, Working) | (Working, Stopped) | (Stopped, Empty) => true,
            _ => false,
        }
    }
}

/// One entry of the table.
#[derive(Debug, Clone)]
pub struct ConnectionSlot {
    pub status: SlotStatus,
    /// Worker serving this slot
    pub worker_id: Option<u64>,
    /// Remote endpoint recorded at accept time
    pub peer: Option<SocketAddr>,
}

impl ConnectionSlot {
    fn empty() -> Self {
        Self {
            status: SlotStatus::Empty,
            worker_id: None,
            peer: None,
        }
    }
}

/// Shared, fixed-capacity table of connection slots.
#[derive(Debug, Clone)]
pub struct SlotTable {
    slots: Arc<RwLock<Vec<ConnectionSlot>>>,
    capacity: usize,
}

impl SlotTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Arc::new(RwLock::new(vec![ConnectionSlot::empty(); capacity])),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Claims the first Empty slot for a new connection.
    ///
    /// Returns `None` when every slot is in use.
    pub async fn claim(&self, peer: SocketAddr, worker_id: u64) -> Option<usize> {
        let mut slots = self.slots.write().await;

        let index = slots.iter().position(|s| s.status == SlotStatus::Empty)?;
        slots[index] = ConnectionSlot {
            status: SlotStatus::New,
            worker_id: Some(worker_id),
            peer: Some(peer),
        };
        Some(index)
    }

    /// Moves slot `index` to `next` if the lifecycle allows it.
    pub async fn transition(&self, index: usize, next: SlotStatus) -> bool {
        let mut slots = self.slots.write().await;

        let Some(slot) = slots.get_mut(index) else {
            return false;
        };

        if !slot.status.can_become(next) {
            tracing::debug!(
                slot = index,
                from = ?slot.status,
                to = ?next,
                "Refusing slot transition"
            );
            return false;
        }

        slot.status = next;
        if next == SlotStatus::Empty {
            slot.worker_id = None;
            slot.peer = None;
        }
        true
    }

    /// Returns a Stopped slot to the pool.
    pub async fn release(&self, index: usize) -> bool {
        self.transition(index, SlotStatus::Empty).await
    }

    /// Frees a slot whose worker died without marking it Stopped.
    pub async fn recover(&self, index: usize) {
        let mut slots = self.slots.write().await;

        if let Some(slot) = slots.get_mut(index) {
            if slot.status != SlotStatus::Finished {
                *slot = ConnectionSlot::empty();
            }
        }
    }

    pub async fn status(&self, index: usize) -> Option<SlotStatus> {
        self.slots.read().await.get(index).map(|s| s.status)
    }

    /// Number of slots currently in `status`.
    pub async fn count(&self, status: SlotStatus) -> usize {
        self.slots
            .read()
            .await
            .iter()
            .filter(|s| s.status == status)
            .count()
    }

    /// Copy of the table (for monitoring/debugging)
    pub async fn snapshot(&self) -> Vec<ConnectionSlot> {
        self.slots.read().await.clone()
    }

    /// Marks every slot Finished. Workers that have not started yet will see
    /// this and exit without serving.
    pub async fn finish_all(&self) {
        let mut slots = self.slots.write().await;
        for slot in slots.iter_mut() {
            slot.status = SlotStatus::Finished;
        }
    }
}
