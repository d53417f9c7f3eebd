//! Redis implementation of [`KeyValueBackend`].

use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tracing::{debug, info};

use super::backend::{KeyValueBackend, WriteBatch, WriteOp};
use super::config::StoreConfig;
use super::error::StoreError;

/// Backend talking to a Redis server over one multiplexed connection.
///
/// Cloning is cheap; clones share the connection.
#[derive(Clone)]
pub struct RedisBackend {
    conn: MultiplexedConnection,
}

impl RedisBackend {
    /// Connect to the server named by `config`.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.url.as_str())?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!(url = %config.url, "connected to Redis");
        Ok(Self { conn })
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend").finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueBackend for RedisBackend {
    async fn is_member(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let found: bool = conn.sismember(key, member).await?;
        Ok(found)
    }

    async fn members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }

    async fn hash(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(key).await?;
        Ok(fields)
    }

    async fn list(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let values: Vec<String> = conn.lrange(key, 0, -1).await?;
        Ok(values)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let ops = batch.len();
        let mut pipe = redis::pipe();
        pipe.atomic();

        for op in batch.into_ops() {
            match op {
                WriteOp::AddToSet { key, member } => {
                    pipe.sadd(key, member).ignore();
                }
                WriteOp::Delete { key } => {
                    pipe.del(key).ignore();
                }
                WriteOp::SetHash { key, fields } => {
                    // HSET with no fields is a syntax error
                    if !fields.is_empty() {
                        pipe.hset_multiple(key, fields.as_slice()).ignore();
                    }
                }
                WriteOp::PushList { key, value } => {
                    pipe.rpush(key, value).ignore();
                }
            }
        }

        let mut conn = self.conn.clone();
        let () = pipe.query_async(&mut conn).await?;
        debug!(ops, "committed transaction");
        Ok(())
    }
}
