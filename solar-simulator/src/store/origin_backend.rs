use std::time::Duration;

use meter_client::{ClientError, OriginBackendClient, SmartMeterRead};

use super::ReadingStore;
use crate::config::OriginBackendConfig;

pub struct OriginBackendStore {
    client: OriginBackendClient,
}

impl OriginBackendStore {
    pub fn new(client: OriginBackendClient) -> Self {
        Self { client }
    }

    /// Build a client and log in with the configured credentials.
    pub async fn connect(cfg: &OriginBackendConfig) -> Result<Self, ClientError> {
        let mut client = OriginBackendClient::new(&cfg.base_url, Duration::from_secs(cfg.timeout_secs))?;
        client.login(&cfg.username, &cfg.password).await?;
        Ok(Self::new(client))
    }
}

#[async_trait::async_trait]
impl ReadingStore for OriginBackendStore {
    async fn latest_meter_reading(&self, device_id: u64) -> Result<Option<SmartMeterRead>, ClientError> {
        self.client.latest_smart_meter_read(device_id).await
    }

    async fn save_meter_readings(&self, device_id: u64, reads: &[SmartMeterRead]) -> Result<(), ClientError> {
        self.client.save_smart_meter_reads(device_id, reads).await
    }
}
