//! Redis connection wrapper with graceful degradation.
//!
//! All operations return `Option<T>` or `bool`. On any Redis error, the operation logs a
//! warning and reports failure. Callers decide what degraded behavior looks like; nothing
//! in the blog requires Redis to serve pages.
use tracing::warn;

#[derive(Clone)]
pub struct RedisCache {
    client: Option<redis::Client>,
}

impl RedisCache {
    /// Attempt to create a client. If the URL is `None` or invalid, returns a `RedisCache`
    /// that always degrades gracefully (no-ops).
    pub fn new(url: Option<&str>) -> Self {
        let client = url.and_then(|u| {
            redis::Client::open(u)
                .inspect_err(|e| warn!(error = %e, url = u, "failed to create redis client, redis disabled"))
                .ok()
        });
        Self { client }
    }

    /// Test the connection by sending a PING. Returns `true` if Redis is reachable.
    pub async fn is_available(&self) -> bool {
        let Some(client) = &self.client else {
            return false;
        };
        match client.get_multiplexed_async_connection().await {
            Ok(mut conn) => {
                let result: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
                result.is_ok()
            }
            Err(_) => false,
        }
    }

    async fn connection(&self) -> Option<redis::aio::MultiplexedConnection> {
        let client = self.client.as_ref()?;
        client
            .get_multiplexed_async_connection()
            .await
            .inspect_err(|e| warn!(error = %e, "redis connection failed"))
            .ok()
    }

    /// Append `value` to the list at `key` and (re)set the list's TTL in seconds.
    /// Returns `true` if successful.
    pub async fn push_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> bool {
        let Some(mut conn) = self.connection().await else {
            return false;
        };
        redis::pipe()
            .atomic()
            .rpush(key, value)
            .ignore()
            .expire(key, ttl_secs as i64)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis RPUSH/EXPIRE failed"))
            .is_ok()
    }

    /// Read every element of the list at `key` and delete it in one MULTI/EXEC, so each
    /// element is handed out at most once. Returns `None` if Redis is unavailable.
    pub async fn drain(&self, key: &str) -> Option<Vec<String>> {
        let mut conn = self.connection().await?;
        let (values,): (Vec<String>,) = redis::pipe()
            .atomic()
            .lrange(key, 0, -1)
            .del(key)
            .ignore()
            .query_async(&mut conn)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis LRANGE/DEL failed"))
            .ok()?;
        Some(values)
    }
}
