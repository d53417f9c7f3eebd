//! Domain types for transit service updates.
//!
//! This module contains the record model shared by the parser, the store
//! and consumers: a `Service` owning its `Stop`s in travel order, and the
//! source partitions it can be stored under.

mod error;
mod service;
mod stop;
mod time;

pub use error::InvalidSource;
pub use service::{ReadMode, Service, ServiceSource};
pub use stop::Stop;
pub use time::{TimeError, format_iso_datetime, parse_iso_datetime, parse_iso_delay};
