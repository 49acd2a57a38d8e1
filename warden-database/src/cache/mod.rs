mod redis_store;

use std::future::Future;
use std::time::Duration;

use anyhow::Context as _;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use redis_store::RedisCacheStore;

/// Optional read-through cache in front of Postgres. Without a Redis store
/// every lookup is a miss and writes are dropped.
#[derive(Clone, Debug)]
pub struct CacheService {
    key_prefix: String,
    redis: Option<RedisCacheStore>,
}

impl CacheService {
    pub fn disabled(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            redis: None,
        }
    }

    pub fn redis(redis_url: &str, prefix: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            key_prefix: prefix.into(),
            redis: Some(RedisCacheStore::from_url(redis_url)?),
        })
    }

    pub fn is_redis_enabled(&self) -> bool {
        self.redis.is_some()
    }

    pub fn key(&self, suffix: impl AsRef<str>) -> String {
        format!("{}:{}", self.key_prefix, suffix.as_ref())
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        match &self.redis {
            Some(store) => store.ping().await,
            None => Ok(()),
        }
    }

    async fn get_json<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let Some(store) = &self.redis else {
            return Ok(None);
        };

        store
            .get(key)
            .await?
            .map(|bytes| {
                serde_json::from_slice(&bytes)
                    .with_context(|| format!("failed to deserialize cache value for `{key}`"))
            })
            .transpose()
    }

    async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let Some(store) = &self.redis else {
            return Ok(());
        };

        let payload = serde_json::to_vec(value)
            .with_context(|| format!("failed to serialize cache value for `{key}`"))?;
        store.set_ex(key, payload, ttl.as_secs().max(1)).await
    }

    pub async fn del(&self, key: &str) -> anyhow::Result<()> {
        match &self.redis {
            Some(store) => store.del(key).await,
            None => Ok(()),
        }
    }

    /// Serve `key` from the cache, falling back to `loader` on a miss or a
    /// cache failure.
    pub async fn get_or_load_json<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> anyhow::Result<T>
    where
        T: Serialize + DeserializeOwned + Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        match self.get_json::<T>(key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => warn!(
                ?e,
                cache_key = key,
                "cache get failed; falling back to database"
            ),
        }

        let loaded = loader().await?;

        if let Err(e) = self.set_json(key, &loaded, ttl).await {
            warn!(
                ?e,
                cache_key = key,
                "cache set failed; returning database value"
            );
        }

        Ok(loaded)
    }
}
