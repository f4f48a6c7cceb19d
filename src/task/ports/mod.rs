//! Port contracts for task persistence.
//!
//! Ports are synchronous: every call runs inside a unit of work opened by a
//! [`TransactionExecutor`](crate::workflow::ports::TransactionExecutor).

pub mod store;

pub use store::{TaskAssignment, TaskEventStore, TaskStore, TaskStoreError, TaskStoreResult};
