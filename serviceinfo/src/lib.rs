//! Transit service update processing.
//!
//! Parses ARNU service update messages into service records with
//! cancellation propagated along each route, stores them in Redis under a
//! scheduled or actual partition, and serves merged lookups over HTTP.

pub mod arnu;
pub mod cache;
pub mod domain;
pub mod filter;
pub mod ingest;
pub mod reference;
pub mod store;
pub mod web;
