//! In-memory collaborator implementations for testing.
//!
//! These stand in for the inventory store, payment processor and ticket
//! notifier in unit and integration tests, and can be told to fail at
//! specific steps to exercise partial-failure paths.

pub mod inventory;
pub mod notification;
pub mod payment;

pub use inventory::MemoryInventoryStore;
pub use notification::{MockTicketNotifier, SentTicket};
pub use payment::{MockPaymentProcessor, RecordedCharge};
