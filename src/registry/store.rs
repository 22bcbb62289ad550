//! Consumer registry implementation
//!
//! The central registry that tracks live consumer connections and fans
//! each broadcast buffer out to every one of them.

use std::io;
use std::os::unix::net::UnixStream;

use tokio::sync::Mutex;

use super::config::RegistryConfig;
use super::consumer::{ConsumerHandle, DeliveryMode};
use super::error::RegistryError;

/// Slot-indexed table of live consumers
///
/// Capacity only grows, never shrinks, so slot indices stay stable for
/// the duration of a fan-out pass. A `None` slot is free capacity.
struct SlotTable {
    slots: Vec<Option<ConsumerHandle>>,
    live: usize,
}

impl SlotTable {
    fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(capacity.max(2), || None);
        Self { slots, live: 0 }
    }

    /// Index of the first free slot, growing the table when none exists
    fn claim_slot(&mut self) -> usize {
        if let Some(idx) = self.slots.iter().position(Option::is_none) {
            return idx;
        }

        let idx = self.slots.len();
        self.grow();
        idx
    }

    fn grow(&mut self) {
        let new_size = (self.slots.len() * 2).max(2);
        self.slots.resize_with(new_size, || None);
    }

    fn insert(&mut self, idx: usize, handle: ConsumerHandle) {
        debug_assert!(self.slots[idx].is_none());
        self.slots[idx] = Some(handle);
        self.live += 1;
    }

    /// Vacate one slot, dropping (and thereby closing) its handle
    fn remove(&mut self, idx: usize) {
        if self.slots[idx].take().is_some() {
            self.live -= 1;
        }
    }

    fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.take();
        }
        self.live = 0;
    }
}

/// Thread-safe registry of attached consumers
///
/// All structural mutation (register, remove, clear) and the broadcast
/// pass itself run under a single mutex, so no handle is ever touched
/// concurrently and two overlapping broadcasts never interleave their
/// per-consumer writes.
pub struct ConsumerRegistry {
    table: Mutex<SlotTable>,
    config: RegistryConfig,
}

impl ConsumerRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            table: Mutex::new(SlotTable::with_capacity(config.initial_capacity)),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a new consumer connection
    ///
    /// The stream is switched to non-blocking mode first; a stream that
    /// cannot be configured is rejected (and closed) with
    /// [`RegistryError::TransportConfig`] rather than kept blocking.
    /// The consumer occupies the first free slot, growing capacity when
    /// the table is full.
    pub async fn register(
        &self,
        stream: UnixStream,
        mode: DeliveryMode,
        flags: u32,
    ) -> Result<(), RegistryError> {
        stream
            .set_nonblocking(true)
            .map_err(RegistryError::TransportConfig)?;

        let mut table = self.table.lock().await;
        let idx = table.claim_slot();
        table.insert(idx, ConsumerHandle::new(stream, mode, flags));

        tracing::debug!(slot = idx, consumers = table.live, "Consumer registered");

        Ok(())
    }

    /// Broadcast `buf` to every registered consumer
    ///
    /// One best-effort write attempt per consumer per call. A write
    /// that would block or was interrupted is skipped: that consumer
    /// simply misses this buffer. Any other write failure removes the
    /// consumer and closes its socket. Nothing is ever surfaced to the
    /// caller; the producer never learns that a consumer fell behind or
    /// disconnected.
    pub async fn broadcast(&self, buf: &[u8]) {
        let mut table = self.table.lock().await;

        // Visit as many occupied slots as were live when the pass
        // started, then stop so trailing free capacity is never
        // scanned. Removals vacate only the slot under visit, which
        // keeps the index walk valid.
        let target = table.live;
        let mut visited = 0;
        let mut idx = 0;

        while idx < table.slots.len() && visited < target {
            let outcome = match &table.slots[idx] {
                Some(handle) => {
                    visited += 1;
                    handle.try_send(buf)
                }
                None => {
                    idx += 1;
                    continue;
                }
            };

            match outcome {
                Ok(written) if written < buf.len() => {
                    tracing::trace!(
                        slot = idx,
                        written = written,
                        len = buf.len(),
                        "Partial delivery"
                    );
                }
                Ok(_) => {}
                Err(e) if is_transient(&e) => {
                    tracing::trace!(slot = idx, "Consumer not ready, skipping");
                }
                Err(e) => {
                    tracing::debug!(slot = idx, error = %e, "Dropping consumer after write failure");
                    table.remove(idx);
                }
            }

            idx += 1;
        }
    }

    /// Number of live consumers
    pub async fn consumer_count(&self) -> usize {
        self.table.lock().await.live
    }

    /// Current slot capacity
    pub async fn capacity(&self) -> usize {
        self.table.lock().await.slots.len()
    }

    /// Drop every consumer, closing their sockets
    ///
    /// Safe to call on an empty registry and safe to call repeatedly.
    /// Slot capacity is retained.
    pub async fn clear(&self) {
        let mut table = self.table.lock().await;

        if table.live > 0 {
            tracing::debug!(consumers = table.live, "Dropping all consumers");
        }
        table.clear();
    }
}

impl Default for ConsumerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Write outcomes that mean "consumer not ready", not "consumer gone"
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}
