use moka::future::Cache;
use moka::Expiry;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60); // 30 minutes

#[derive(Clone, Debug)]
struct Timed<V> {
    value: V,
    ttl: Duration,
}

struct PerEntryTtl;

impl<K, V> Expiry<K, Timed<V>> for PerEntryTtl {
    fn expire_after_create(&self, _key: &K, entry: &Timed<V>, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Memoizes successful upstream responses until their TTL runs out.
///
/// Failed producers leave no entry behind. Concurrent misses on one key are
/// coalesced: a single producer runs and every waiter gets its outcome.
pub struct ResponseCache<K, V> {
    entries: Cache<K, Timed<V>>,
}

impl<K, V> ResponseCache<K, V>
where
    K: Hash + Eq + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { entries }
    }

    pub async fn get_or_compute<F, E>(&self, key: K, ttl: Duration, producer: F) -> Result<V, Arc<E>>
    where
        F: Future<Output = Result<V, E>>,
        E: Send + Sync + 'static,
    {
        tracing::trace!("Cache lookup for {:?}", key);

        let entry = self
            .entries
            .entry(key)
            .or_try_insert_with(async move {
                producer.await.map(|value| Timed { value, ttl })
            })
            .await?;

        if entry.is_fresh() {
            tracing::debug!("Cache miss for {:?}, stored for {:?}", entry.key(), ttl);
        } else {
            tracing::debug!("Cache hit for {:?}", entry.key());
        }

        Ok(entry.into_value().value)
    }
}
