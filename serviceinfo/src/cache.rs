//! Caching layer for service lookups.
//!
//! Number lookups are cached per (date, number, read mode) for a short TTL.
//! Writes made through the cached store drop every cached mode for the
//! written number, so a reader of this process never sees its own writes
//! late.
//!
//! Writes by other processes are not seen until the TTL expires. This
//! includes the `ingest` command, which writes through a plain
//! [`ServiceStore`] while `serve` only reads: a service ingested while the
//! server is running shows up there after at most `CacheConfig::ttl`.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use moka::future::Cache as MokaCache;

use crate::domain::{ReadMode, Service, ServiceSource};
use crate::store::{KeyValueBackend, ServiceStore, StoreError};

/// Cache key for number lookups: (service date, service number, read mode).
type LookupKey = (NaiveDate, u32, ReadMode);

/// Cached lookup result.
type LookupEntry = Arc<Vec<Service>>;

const ALL_MODES: [ReadMode; 3] = [
    ReadMode::Merged,
    ReadMode::Only(ServiceSource::Scheduled),
    ReadMode::Only(ServiceSource::Actual),
];

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Service store with a read cache in front of number lookups.
pub struct CachedServiceStore<B> {
    store: ServiceStore<B>,
    lookups: MokaCache<LookupKey, LookupEntry>,
}

impl<B: KeyValueBackend> CachedServiceStore<B> {
    /// Create a new cached store.
    pub fn new(store: ServiceStore<B>, config: &CacheConfig) -> Self {
        let lookups = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { store, lookups }
    }

    /// Look up services by number, using the cache if available.
    ///
    /// Only found results are cached; a miss is asked again next time.
    pub async fn get_service(
        &self,
        date: NaiveDate,
        number: u32,
        mode: ReadMode,
    ) -> Result<Option<LookupEntry>, StoreError> {
        let key = (date, number, mode);

        if let Some(cached) = self.lookups.get(&key).await {
            return Ok(Some(cached));
        }

        let Some(services) = self.store.get_service(date, number, mode).await? else {
            return Ok(None);
        };

        let entry = Arc::new(services);
        self.lookups.insert(key, entry.clone()).await;

        Ok(Some(entry))
    }

    /// Look up one record by id. Not cached.
    pub async fn get_service_details(
        &self,
        date: NaiveDate,
        service_id: &str,
        mode: ReadMode,
    ) -> Result<Option<Service>, StoreError> {
        self.store.get_service_details(date, service_id, mode).await
    }

    /// Write one record and drop cached lookups of its number.
    pub async fn store_service(&self, service: &Service, source: ServiceSource) -> Result<(), StoreError> {
        let result = self.store.store_service(service, source).await;
        // A failed commit may still have reached the server
        self.invalidate(service.service_date, service.service_number)
            .await;
        result
    }

    /// Write each record in turn, see [`ServiceStore::store_services`].
    pub async fn store_services(&self, services: &[Service], source: ServiceSource) -> Result<usize, StoreError> {
        for service in services {
            self.store_service(service, source).await?;
        }
        Ok(services.len())
    }

    /// Drop cached lookups of one service number, in every mode.
    pub async fn invalidate(&self, date: NaiveDate, number: u32) {
        for mode in ALL_MODES {
            self.lookups.invalidate(&(date, number, mode)).await;
        }
    }

    /// Access the underlying store for operations that bypass the cache.
    pub fn store(&self) -> &ServiceStore<B> {
        &self.store
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.lookups.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.lookups.invalidate_all();
    }
}
