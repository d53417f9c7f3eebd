//! Service record persistence.
//!
//! Records live in a networked key-value store, partitioned by source
//! (`scheduled` / `actual`) and keyed by service date, number and id:
//!
//! | Structure | Key | Contents |
//! |---|---|---|
//! | set | `services:{source}:{date}` | service numbers |
//! | set | `services:{source}:{date}:{number}` | service ids with that number |
//! | hash | `schedule:{source}:{date}:{id}:info` | service metadata |
//! | list | `schedule:{source}:{date}:{id}:stops` | stop codes in travel order |
//! | hash | `schedule:{source}:{date}:{id}:stops:{code}` | stop fields |
//!
//! Each record write is one [`WriteBatch`], committed by the backend as a
//! single transaction. Writes of several records are independent.

mod backend;
pub mod codec;
mod config;
mod error;
pub mod keys;
mod memory;
mod redis_backend;
mod service_store;

pub use backend::{KeyValueBackend, SharedBackend, WriteBatch, WriteOp};
pub use config::{DEFAULT_URL, StoreConfig};
pub use error::StoreError;
pub use memory::MemoryBackend;
pub use redis_backend::RedisBackend;
pub use service_store::ServiceStore;
