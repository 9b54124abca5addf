pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unreachable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The shared store every coordinator instance reads round state and scores
/// from. One authoritative store per cluster; implementations must make each
/// operation atomic on its own.
#[async_trait]
pub trait SharedStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Conditional write: succeeds only while the stored value still equals
    /// `expected`. `expected = None` means the key must be absent.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> StoreResult<bool>;

    /// Adds `delta` to the member's score, creating it at zero first if
    /// absent. Returns the score after the increment.
    async fn zincr_by(&self, set_key: &str, member: &str, delta: f64) -> StoreResult<f64>;

    async fn zscore(&self, set_key: &str, member: &str) -> StoreResult<Option<f64>>;

    /// 0-based rank in descending score order. Ties rank lexicographically
    /// smaller members first.
    async fn zrank(&self, set_key: &str, member: &str) -> StoreResult<Option<u64>>;
}
