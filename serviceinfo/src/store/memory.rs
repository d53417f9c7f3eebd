//! In-memory backend for testing without a Redis server.
//!
//! Mirrors the Redis semantics the store relies on: missing keys read as
//! empty, writes create keys on demand and a key holds exactly one kind of
//! structure.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::backend::{KeyValueBackend, WriteBatch, WriteOp};
use super::error::StoreError;

#[derive(Debug, Clone)]
enum Value {
    Set(BTreeSet<String>),
    Hash(HashMap<String, String>),
    List(Vec<String>),
}

type Data = HashMap<String, Value>;

/// Key-value backend held in process memory.
///
/// Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<Data>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// All keys currently present, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let data = self.data.read().await;
        let mut keys: Vec<String> = data.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns true if `key` exists.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.data.read().await.contains_key(key)
    }

    /// Overwrite one hash field directly, bypassing the store.
    pub async fn set_field(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        hash_mut(&mut data, key)?.insert(field.to_string(), value.to_string());
        Ok(())
    }
}

fn wrong_type(key: &str) -> StoreError {
    StoreError::WrongType {
        key: key.to_string(),
    }
}

fn hash_mut<'a>(data: &'a mut Data, key: &str) -> Result<&'a mut HashMap<String, String>, StoreError> {
    match data
        .entry(key.to_string())
        .or_insert_with(|| Value::Hash(HashMap::new()))
    {
        Value::Hash(fields) => Ok(fields),
        _ => Err(wrong_type(key)),
    }
}

fn apply(data: &mut Data, op: WriteOp) -> Result<(), StoreError> {
    match op {
        WriteOp::AddToSet { key, member } => {
            match data
                .entry(key.clone())
                .or_insert_with(|| Value::Set(BTreeSet::new()))
            {
                Value::Set(members) => {
                    members.insert(member);
                }
                _ => return Err(wrong_type(&key)),
            }
        }
        WriteOp::Delete { key } => {
            data.remove(&key);
        }
        WriteOp::SetHash { key, fields } => {
            hash_mut(data, &key)?.extend(fields);
        }
        WriteOp::PushList { key, value } => {
            match data
                .entry(key.clone())
                .or_insert_with(|| Value::List(Vec::new()))
            {
                Value::List(values) => values.push(value),
                _ => return Err(wrong_type(&key)),
            }
        }
    }
    Ok(())
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn is_member(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        match self.data.read().await.get(key) {
            None => Ok(false),
            Some(Value::Set(members)) => Ok(members.contains(member)),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        match self.data.read().await.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Set(members)) => Ok(members.iter().cloned().collect()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn hash(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        match self.data.read().await.get(key) {
            None => Ok(HashMap::new()),
            Some(Value::Hash(fields)) => Ok(fields.clone()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn list(&self, key: &str) -> Result<Vec<String>, StoreError> {
        match self.data.read().await.get(key) {
            None => Ok(Vec::new()),
            Some(Value::List(values)) => Ok(values.clone()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    /// Applies the batch to copies of the keys it touches, then swaps them
    /// in. A failing op leaves nothing behind. Cost is proportional to the
    /// size of the touched values, not of the whole keyspace.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut data = self.data.write().await;

        let touched: BTreeSet<String> = batch.ops().iter().map(|op| op.key().to_string()).collect();
        let mut staged: Data = touched
            .iter()
            .filter_map(|key| data.get(key).map(|value| (key.clone(), value.clone())))
            .collect();

        for op in batch.into_ops() {
            apply(&mut staged, op)?;
        }

        for key in touched {
            match staged.remove(&key) {
                Some(value) => {
                    data.insert(key, value);
                }
                None => {
                    data.remove(&key);
                }
            }
        }

        Ok(())
    }
}
