//! Key-value backend interface.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::error::StoreError;

/// One primitive write against the key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Add a member to a set, creating it if needed
    AddToSet { key: String, member: String },
    /// Remove a key of any type
    Delete { key: String },
    /// Set fields on a hash, keeping fields not listed
    SetHash {
        key: String,
        fields: Vec<(String, String)>,
    },
    /// Append a value to a list, creating it if needed
    PushList { key: String, value: String },
}

impl WriteOp {
    /// Key the operation writes to.
    pub fn key(&self) -> &str {
        match self {
            WriteOp::AddToSet { key, .. }
            | WriteOp::Delete { key }
            | WriteOp::SetHash { key, .. }
            | WriteOp::PushList { key, .. } => key,
        }
    }
}

/// Ordered group of writes committed as one transaction.
///
/// Backends apply every operation of a batch as a unit: a concurrent reader
/// sees either none or all of it. Separate batches are independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_to_set(&mut self, key: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::AddToSet {
            key: key.into(),
            member: member.into(),
        });
        self
    }

    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::Delete { key: key.into() });
        self
    }

    pub fn set_hash(&mut self, key: impl Into<String>, fields: Vec<(String, String)>) -> &mut Self {
        self.ops.push(WriteOp::SetHash {
            key: key.into(),
            fields,
        });
        self
    }

    pub fn push_list(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::PushList {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Operations in commit order.
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Networked key-value store with sets, hashes and lists.
///
/// Reads of missing keys return empty values rather than errors.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Is `member` in the set at `key`?
    async fn is_member(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// All members of the set at `key`, in no particular order.
    async fn members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// All fields of the hash at `key`.
    async fn hash(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

    /// All values of the list at `key`, in order.
    async fn list(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Apply a batch of writes as one transaction.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

/// Type-erased backend shared between tasks.
pub type SharedBackend = Arc<dyn KeyValueBackend>;

// Blanket implementation for Arc<T>
#[async_trait]
impl<T: KeyValueBackend + ?Sized> KeyValueBackend for Arc<T> {
    async fn is_member(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        (**self).is_member(key, member).await
    }

    async fn members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        (**self).members(key).await
    }

    async fn hash(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        (**self).hash(key).await
    }

    async fn list(&self, key: &str) -> Result<Vec<String>, StoreError> {
        (**self).list(key).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        (**self).commit(batch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_preserves_order() {
        let mut batch = WriteBatch::new();
        batch
            .add_to_set("s", "1")
            .delete("h")
            .set_hash("h", vec![("f".into(), "v".into())])
            .push_list("l", "a");

        assert_eq!(batch.len(), 4);
        assert_eq!(
            batch.ops()[0],
            WriteOp::AddToSet {
                key: "s".into(),
                member: "1".into()
            }
        );
        assert_eq!(batch.ops()[1], WriteOp::Delete { key: "h".into() });
        assert!(matches!(batch.ops()[3], WriteOp::PushList { .. }));

        let keys: Vec<&str> = batch.ops().iter().map(WriteOp::key).collect();
        assert_eq!(keys, ["s", "h", "h", "l"]);
    }

    #[test]
    fn empty_batch() {
        let batch = WriteBatch::new();
        assert!(batch.is_empty());
        assert!(batch.into_ops().is_empty());
    }
}
