//! # pb-store-redis
//!
//! Redis implementation of `PasteStore`.
//! Records are stored as JSON strings under `<prefix><id>` (default prefix
//! `paste:`). The conditional replace runs as a Lua script so the views
//! comparison and the write happen in one server-side step.

use async_trait::async_trait;
use deadpool_redis::redis::{self, AsyncCommands, Script};
use deadpool_redis::{Config, Connection, Pool, Runtime};
use pb_core::error::{AppError, Result};
use pb_core::models::PasteRecord;
use pb_core::traits::PasteStore;

/// Returns 1 when the write happened, 0 when views moved on, -1 when the key is gone.
const REPLACE_IF_VIEWS: &str = r"
local raw = redis.call('GET', KEYS[1])
if not raw then
  return -1
end
local current = cjson.decode(raw)
if tonumber(current.views) ~= tonumber(ARGV[1]) then
  return 0
end
redis.call('SET', KEYS[1], ARGV[2])
return 1
";

pub struct RedisPasteStore {
    pool: Pool,
    key_prefix: String,
    replace_script: Script,
}

impl RedisPasteStore {
    /// Builds a connection pool for `url`. Connections are opened lazily.
    pub fn connect(url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let pool = Config::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(AppError::store)?;
        Ok(Self::with_pool(pool, key_prefix))
    }

    pub fn with_pool(pool: Pool, key_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            key_prefix: key_prefix.into(),
            replace_script: Script::new(REPLACE_IF_VIEWS),
        }
    }

    fn key(&self, id: &str) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    async fn conn(&self) -> Result<Connection> {
        self.pool.get().await.map_err(|err| {
            tracing::error!(error = %err, "redis pool checkout failed");
            AppError::store(err)
        })
    }
}

fn encode(record: &PasteRecord) -> Result<String> {
    serde_json::to_string(record).map_err(AppError::store)
}

fn decode(id: &str, raw: &str) -> Result<PasteRecord> {
    serde_json::from_str(raw)
        .map_err(|err| AppError::Store(format!("corrupt record for {id}: {err}")))
}

fn redis_err(err: redis::RedisError) -> AppError {
    tracing::error!(error = %err, "redis command failed");
    AppError::store(err)
}

#[async_trait]
impl PasteStore for RedisPasteStore {
    async fn put(&self, record: &PasteRecord) -> Result<()> {
        let value = encode(record)?;
        let mut conn = self.conn().await?;
        conn.set::<_, _, ()>(self.key(&record.id), value)
            .await
            .map_err(redis_err)
    }

    async fn get(&self, id: &str) -> Result<Option<PasteRecord>> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get(self.key(id)).await.map_err(redis_err)?;
        raw.map(|raw| decode(id, &raw)).transpose()
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(self.key(id)).await.map_err(redis_err)
    }

    async fn replace_if_views(&self, record: &PasteRecord, expected_views: u64) -> Result<bool> {
        let value = encode(record)?;
        let mut conn = self.conn().await?;
        let outcome: i64 = self
            .replace_script
            .key(self.key(&record.id))
            .arg(expected_views)
            .arg(value)
            .invoke_async(&mut conn)
            .await
            .map_err(redis_err)?;

        if outcome < 0 {
            tracing::debug!(id = %record.id, "conditional replace found no record");
        }
        Ok(outcome == 1)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(redis_err)?;
        Ok(())
    }
}
