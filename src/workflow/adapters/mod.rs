//! Transaction executor implementations.

pub mod memory;
pub mod postgres;
