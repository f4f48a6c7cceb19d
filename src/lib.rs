//! Tasklane: multi-tenant task API with a transactional write pipeline.
//!
//! Every write composes idempotency-key deduplication, an
//! optimistic-version-checked mutation and an outbox event into one atomic
//! unit of work.
//!
//! # Architecture
//!
//! Tasklane follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business types with no infrastructure dependencies
//! - **Ports**: Store and unit-of-work traits
//! - **Adapters**: In-memory and `PostgreSQL` executors, the HTTP router
//!
//! # Modules
//!
//! - [`tenancy`]: Tenant, workspace and user identifiers, caller roles
//! - [`task`]: Task aggregate, outbox events and their stores
//! - [`idempotency`]: Replayable records of keyed writes
//! - [`workflow`]: Transactional create and assign orchestration
//! - [`api`]: HTTP request adapter
//! - [`config`], [`telemetry`]: Process configuration and logging

pub mod api;
pub mod config;
pub mod idempotency;
pub mod task;
pub mod telemetry;
pub mod tenancy;
pub mod workflow;
