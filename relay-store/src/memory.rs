use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::{SharedStore, StoreResult};

/// In-process implementation of [`SharedStore`] for single-instance
/// deployments and tests. Plain keys live in one `DashMap`, ordered sets in
/// another; the entry API pins the shard lock for the duration of each
/// operation, which gives per-key atomicity without a global lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    strings: DashMap<String, String>,
    zsets: DashMap<String, HashMap<String, f64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.strings.get(key).map(|v| v.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.strings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> StoreResult<bool> {
        let swapped = match self.strings.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => match expected {
                Some(expected) if occupied.get() == expected => {
                    occupied.insert(new.to_string());
                    true
                }
                _ => false,
            },
            Entry::Vacant(vacant) => match expected {
                None => {
                    vacant.insert(new.to_string());
                    true
                }
                Some(_) => false,
            },
        };
        Ok(swapped)
    }

    async fn zincr_by(&self, set_key: &str, member: &str, delta: f64) -> StoreResult<f64> {
        let mut zset = self.zsets.entry(set_key.to_string()).or_default();
        let score = zset.entry(member.to_string()).or_insert(0.0);
        *score += delta;
        Ok(*score)
    }

    async fn zscore(&self, set_key: &str, member: &str) -> StoreResult<Option<f64>> {
        Ok(self
            .zsets
            .get(set_key)
            .and_then(|zset| zset.get(member).copied()))
    }

    async fn zrank(&self, set_key: &str, member: &str) -> StoreResult<Option<u64>> {
        let Some(zset) = self.zsets.get(set_key) else {
            return Ok(None);
        };
        let Some(score) = zset.get(member).copied() else {
            return Ok(None);
        };

        let rank = zset
            .iter()
            .filter(|&(other, &other_score)| {
                other_score > score
                    || (other_score == score && other.as_str() < member)
            })
            .count() as u64;
        Ok(Some(rank))
    }
}
