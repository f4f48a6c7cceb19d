//! Domain model for idempotency records.

mod error;
mod record;

pub use error::{IdempotencyDomainError, ParseIdempotencyActionError, ParseReferenceTypeError};
pub use record::{
    IdempotencyAction, IdempotencyKey, IdempotencyRecord, IdempotencyRecordId,
    NewIdempotencyRecord, ReferenceType, RequestFingerprint,
};
