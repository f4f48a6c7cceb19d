//! Port contracts for transactional units of work.

pub mod unit_of_work;

pub use unit_of_work::{TransactionError, TransactionExecutor, TransactionScope, UnitOfWork};
