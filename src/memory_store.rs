use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::{KeyValueStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    List(Vec<String>),
}

/// In-process [`KeyValueStore`] with the same semantics as the Redis backend.
///
/// A single mutex serializes every command, which gives counters the same
/// atomicity Redis provides.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn add(&self, key: &str, delta: i64) -> StoreResult<i64> {
        let mut entries = self.entries.lock();
        let current = match entries.get(key) {
            None => 0,
            Some(Value::Text(text)) => text
                .parse::<i64>()
                .map_err(|_| StoreError::corrupt(key, "value is not an integer"))?,
            Some(Value::List(_)) => return Err(StoreError::WrongType(key.to_string())),
        };
        let next = current
            .checked_add(delta)
            .ok_or_else(|| StoreError::corrupt(key, "increment would overflow"))?;
        entries.insert(key.to_string(), Value::Text(next.to_string()));
        Ok(next)
    }
}

/// Resolve Redis-style inclusive indexes against a list of `len` elements.
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match self.entries.lock().get(key) {
            None => Ok(None),
            Some(Value::Text(text)) => Ok(Some(text.clone())),
            Some(Value::List(_)) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .lock()
            .insert(key.to_string(), Value::Text(value.to_string()));
        Ok(())
    }

    async fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        self.add(key, delta)
    }

    async fn decr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        self.add(key, -delta)
    }

    async fn list_push(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock();
        match entries
            .entry(key.to_string())
            .or_insert_with(|| Value::List(Vec::new()))
        {
            Value::List(items) => {
                items.push(value.to_string());
                Ok(())
            }
            Value::Text(_) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        match self.entries.lock().get(key) {
            None => Ok(Vec::new()),
            Some(Value::List(items)) => Ok(resolve_range(items.len(), start, stop)
                .map(|(from, to)| items[from..=to].to_vec())
                .unwrap_or_default()),
            Some(Value::Text(_)) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    async fn flush_all(&self) -> StoreResult<()> {
        self.entries.lock().clear();
        Ok(())
    }
}
