//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisError, aio::ConnectionManager};
use tracing::{debug, info};

/// Redis cache used in production.
///
/// Uses `ConnectionManager` for automatic reconnects; the manager is cheap to clone,
/// so every operation works on its own handle. Every method maps onto exactly one
/// Redis command, which keeps `INCR` and the list operations atomic.
pub struct RedisCache {
    client: ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Failed to create Redis client: {}", e)))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self { client: manager })
    }
}

/// Compare-and-delete, evaluated server side so no other client can interleave.
const DEL_IF_EQ_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#;

fn command_error<'a>(op: &'static str, key: &'a str) -> impl FnOnce(RedisError) -> CacheError + 'a {
    move |e| CacheError::Command(format!("{} {}: {}", op, key, e))
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.client.clone();
        let value = conn
            .get::<_, Option<String>>(key)
            .await
            .map_err(command_error("GET", key))?;

        debug!(key, hit = value.is_some(), "Redis GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(command_error("SET", key))
    }

    async fn set_nx_ex(&self, key: &str, value: &str, seconds: u64) -> CacheResult<bool> {
        let mut conn = self.client.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(seconds)
            .query_async(&mut conn)
            .await
            .map_err(command_error("SET NX", key))?;

        Ok(reply.is_some())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(command_error("DEL", key))
    }

    async fn del_if_eq(&self, key: &str, value: &str) -> CacheResult<bool> {
        let mut conn = self.client.clone();
        let deleted: i64 = redis::cmd("EVAL")
            .arg(DEL_IF_EQ_SCRIPT)
            .arg(1)
            .arg(key)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(command_error("EVAL DEL_IF_EQ", key))?;

        Ok(deleted == 1)
    }

    async fn incr(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.client.clone();
        conn.incr::<_, _, i64>(key, 1i64)
            .await
            .map_err(command_error("INCR", key))
    }

    async fn expire(&self, key: &str, seconds: u64) -> CacheResult<()> {
        let mut conn = self.client.clone();
        conn.expire::<_, ()>(key, seconds as i64)
            .await
            .map_err(command_error("EXPIRE", key))
    }

    async fn rpush(&self, key: &str, value: &str) -> CacheResult<u64> {
        let mut conn = self.client.clone();
        conn.rpush::<_, _, u64>(key, value)
            .await
            .map_err(command_error("RPUSH", key))
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> CacheResult<Vec<String>> {
        let mut conn = self.client.clone();
        conn.lrange::<_, Vec<String>>(key, start, stop)
            .await
            .map_err(command_error("LRANGE", key))
    }

    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> CacheResult<()> {
        let mut conn = self.client.clone();
        conn.ltrim::<_, ()>(key, start, stop)
            .await
            .map_err(command_error("LTRIM", key))
    }

    async fn llen(&self, key: &str) -> CacheResult<u64> {
        let mut conn = self.client.clone();
        conn.llen::<_, u64>(key)
            .await
            .map_err(command_error("LLEN", key))
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
