use meter_client::{db::smart_meter_queries, ClientError, SmartMeterRead};
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::ReadingStore;
use crate::config::QuestDbConfig;

/// Reads and writes `smart_meter_reads` in QuestDB over pgwire.
pub struct QuestDbReadingStore {
    pool: PgPool,
}

impl QuestDbReadingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(cfg: &QuestDbConfig) -> Result<Self, ClientError> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .connect(&cfg.uri)
            .await?;
        Ok(Self::new(pool))
    }
}

#[async_trait::async_trait]
impl ReadingStore for QuestDbReadingStore {
    async fn latest_meter_reading(&self, device_id: u64) -> Result<Option<SmartMeterRead>, ClientError> {
        smart_meter_queries::latest_smart_meter_read(&self.pool, device_id).await
    }

    async fn save_meter_readings(&self, device_id: u64, reads: &[SmartMeterRead]) -> Result<(), ClientError> {
        let inserted = smart_meter_queries::insert_smart_meter_reads(&self.pool, device_id, reads).await?;
        tracing::debug!(device_id, inserted, "smart meter reads written to questdb");
        Ok(())
    }
}
