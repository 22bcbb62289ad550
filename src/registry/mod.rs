//! Consumer registry for broadcast fan-out
//!
//! The registry tracks every attached consumer in a slot table and
//! delivers each broadcast buffer to all of them under one lock.
//!
//! # Architecture
//!
//! ```text
//!                      Arc<ConsumerRegistry>
//!                  ┌──────────────────────────┐
//!                  │ Mutex<SlotTable {        │
//!                  │   slots: Vec<Option<     │
//!                  │     ConsumerHandle>>,    │
//!                  │   live,                  │
//!                  │ }>                       │
//!                  └────────────┬─────────────┘
//!                               │ broadcast(buf)
//!            ┌──────────────────┼──────────────────┐
//!            ▼                  ▼                  ▼
//!       [Consumer]         [Consumer]         [Consumer]
//!       try_send()         try_send()         try_send()
//! ```
//!
//! # Delivery policy
//!
//! Delivery is best-effort and lossy: each broadcast makes exactly one
//! non-blocking write attempt per consumer. A write that would block is
//! skipped, so a consumer that cannot keep up loses data rather than
//! slowing the producer. Any other write failure drops the consumer.
//! There is no per-consumer backlog and no retry.

pub mod config;
pub mod consumer;
pub mod error;
pub mod store;

pub use config::RegistryConfig;
pub use consumer::{ConsumerHandle, DeliveryMode};
pub use error::RegistryError;
pub use store::ConsumerRegistry;
