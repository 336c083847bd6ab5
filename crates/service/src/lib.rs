//! Service layer: player persistence behind a storage-agnostic repository contract,
//! plus the use cases and health aggregation built on top of it.
//! - `player`: domain record, repository contract, volatile and durable+cache backends.
//! - `cache`: key-value cache handle (Redis, in-process).
//! - `health`: composite dependency status.
//! - `auth`: login / registration use cases.

pub mod errors;
pub mod auth;
pub mod cache;
pub mod health;
pub mod messaging;
pub mod player;
#[cfg(test)]
pub mod test_support;
