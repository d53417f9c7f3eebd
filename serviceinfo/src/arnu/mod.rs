//! ARNU service update message parser.
//!
//! An update message is an XML envelope holding a `ServiceInfoList` with
//! one `ServiceInfo` per service run. Each run carries its stops in travel
//! order; stops tagged `Cancelled-Stop` or `Diverted-Stop` cancel the
//! departure from that stop and every later arrival.
//!
//! Key characteristics:
//! - A malformed envelope yields no result and is only logged
//! - A missing required field in any one service aborts the whole batch
//! - No stop is dropped while parsing

mod error;
mod parse;

pub use error::ParseError;
pub use parse::{parse_message, parse_service};
