//! Storage engine implementation.

use dashmap::DashMap;
use sled::{Db, Tree};
use tracing::debug;

use super::key::encode_key;
use super::{Record, StorageConfig};
use crate::error::Error;
use crate::value::Value;

/// Tree name for engine metadata (sequences).
const META_TREE: &str = "meta";

/// Prefix for per-model data trees.
const TABLE_PREFIX: &str = "table:";

/// Prefix for sequence counters in the meta tree.
const SEQUENCE_PREFIX: &str = "seq:";

/// The storage engine wrapping sled.
///
/// Each model gets its own tree keyed by its encoded primary key.
pub struct StorageEngine {
    /// The underlying sled database.
    db: Db,

    /// Tree for metadata.
    meta_tree: Tree,

    /// Opened table trees by model name.
    tables: DashMap<String, Tree>,
}

impl StorageEngine {
    /// Open or create a storage engine with the given configuration.
    pub fn open(config: StorageConfig) -> Result<Self, Error> {
        let db = config.to_sled_config().open()?;
        let meta_tree = db.open_tree(META_TREE)?;

        Ok(Self {
            db,
            meta_tree,
            tables: DashMap::new(),
        })
    }

    /// Check if the database was recovered from a previous run.
    pub fn was_recovered(&self) -> bool {
        self.db.was_recovered()
    }

    fn table(&self, table: &str) -> Result<Tree, Error> {
        if let Some(tree) = self.tables.get(table) {
            return Ok(tree.value().clone());
        }
        let tree = self.db.open_tree(format!("{}{}", TABLE_PREFIX, table))?;
        self.tables.insert(table.to_string(), tree.clone());
        Ok(tree)
    }

    /// Insert a record if the key is free.
    ///
    /// Returns false without writing when the key already exists.
    pub fn insert(&self, table: &str, key: &Value, record: &Record) -> Result<bool, Error> {
        let tree = self.table(table)?;
        let key_bytes = encode_key(key)?;
        let value_bytes = record.to_bytes()?;

        let swapped = tree.compare_and_swap(key_bytes, None as Option<&[u8]>, Some(value_bytes))?;
        debug!(table, key = %key, inserted = swapped.is_ok(), "insert");
        Ok(swapped.is_ok())
    }

    /// Write a record, replacing any existing one.
    pub fn put(&self, table: &str, key: &Value, record: &Record) -> Result<(), Error> {
        let tree = self.table(table)?;
        tree.insert(encode_key(key)?, record.to_bytes()?)?;
        debug!(table, key = %key, "put");
        Ok(())
    }

    /// Get a record by key.
    pub fn get(&self, table: &str, key: &Value) -> Result<Option<Record>, Error> {
        let tree = self.table(table)?;
        match tree.get(encode_key(key)?)? {
            Some(bytes) => Ok(Some(Record::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Remove a record. Returns whether it existed.
    pub fn remove(&self, table: &str, key: &Value) -> Result<bool, Error> {
        let tree = self.table(table)?;
        let removed = tree.remove(encode_key(key)?)?.is_some();
        debug!(table, key = %key, removed, "remove");
        Ok(removed)
    }

    /// Scan all records of a table in key order.
    pub fn scan(&self, table: &str) -> Result<impl Iterator<Item = Result<Record, Error>>, Error> {
        let tree = self.table(table)?;
        Ok(tree.iter().map(|result| {
            let (_, value_bytes) = result?;
            Record::from_bytes(&value_bytes)
        }))
    }

    /// Advance the table's sequence and return the new value.
    pub fn next_sequence(&self, table: &str) -> Result<i64, Error> {
        let next = self
            .meta_tree
            .update_and_fetch(sequence_key(table), |old| {
                let current = old.map(decode_counter).unwrap_or(0);
                Some(current.saturating_add(1).to_be_bytes().to_vec())
            })?
            .map(|bytes| decode_counter(&bytes))
            .unwrap_or(1);
        Ok(next)
    }

    /// Make sure the table's sequence is at least `value`.
    ///
    /// Called when a caller supplies an explicit id, so later generated ids
    /// never collide with it.
    pub fn observe_sequence(&self, table: &str, value: i64) -> Result<(), Error> {
        self.meta_tree.fetch_and_update(sequence_key(table), |old| {
            let current = old.map(decode_counter).unwrap_or(0);
            Some(current.max(value).to_be_bytes().to_vec())
        })?;
        Ok(())
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }
}

fn sequence_key(table: &str) -> Vec<u8> {
    format!("{}{}", SEQUENCE_PREFIX, table).into_bytes()
}

fn decode_counter(bytes: &[u8]) -> i64 {
    let mut buf = [0u8; 8];
    if bytes.len() == 8 {
        buf.copy_from_slice(bytes);
    }
    i64::from_be_bytes(buf)
}
