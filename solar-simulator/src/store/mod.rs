//! Where cumulative reads come from (the seed) and go to (the batch).

pub mod origin_backend;
pub mod questdb;

use meter_client::{ClientError, SmartMeterRead};

use crate::config::StoreConfig;

pub use origin_backend::OriginBackendStore;
pub use questdb::QuestDbReadingStore;

#[async_trait::async_trait]
pub trait ReadingStore: Send + Sync {
    /// Latest persisted read for the device, `None` if it never reported.
    async fn latest_meter_reading(&self, device_id: u64) -> Result<Option<SmartMeterRead>, ClientError>;

    /// Persist the whole ordered batch in one call.
    async fn save_meter_readings(&self, device_id: u64, reads: &[SmartMeterRead]) -> Result<(), ClientError>;
}

/// Backend selected by configuration.
pub enum ConfiguredStore {
    OriginBackend(OriginBackendStore),
    QuestDb(QuestDbReadingStore),
}

impl ConfiguredStore {
    /// Open a fresh store for one worker; the origin backend gets its own login.
    pub async fn connect(cfg: &StoreConfig, device_id: u64) -> Result<Self, ClientError> {
        match cfg {
            StoreConfig::OriginBackend(backend) => {
                let store = OriginBackendStore::connect(backend).await?;
                tracing::debug!(device_id, "origin backend session opened");
                Ok(Self::OriginBackend(store))
            }
            StoreConfig::QuestDb(questdb) => {
                let store = QuestDbReadingStore::connect(questdb).await?;
                tracing::debug!(device_id, "questdb pool opened");
                Ok(Self::QuestDb(store))
            }
        }
    }
}

#[async_trait::async_trait]
impl ReadingStore for ConfiguredStore {
    async fn latest_meter_reading(&self, device_id: u64) -> Result<Option<SmartMeterRead>, ClientError> {
        match self {
            Self::OriginBackend(s) => s.latest_meter_reading(device_id).await,
            Self::QuestDb(s) => s.latest_meter_reading(device_id).await,
        }
    }

    async fn save_meter_readings(&self, device_id: u64, reads: &[SmartMeterRead]) -> Result<(), ClientError> {
        match self {
            Self::OriginBackend(s) => s.save_meter_readings(device_id, reads).await,
            Self::QuestDb(s) => s.save_meter_readings(device_id, reads).await,
        }
    }
}
