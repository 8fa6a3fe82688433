use std::{fs, path::PathBuf};

use meter_client::Device;
use serde::Deserialize;

use crate::synthesis::REFERENCE_YEAR;
use crate::worker::WorkerSettings;

fn default_interval_minutes() -> u32 {
    15
}

fn default_reference_year() -> i32 {
    REFERENCE_YEAR
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    2
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    pub dataset_path: PathBuf,
    #[serde(default)]
    pub dataset_has_headers: bool,
    #[serde(default = "default_interval_minutes")]
    pub readings_interval_minutes: u32,
    #[serde(default = "default_reference_year")]
    pub reference_year: i32,
}

impl SimulatorConfig {
    pub fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            interval_minutes: self.readings_interval_minutes,
            reference_year: self.reference_year,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OriginBackendConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestDbConfig {
    pub uri: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum StoreConfig {
    #[serde(rename = "origin_backend")]
    OriginBackend(OriginBackendConfig),
    #[serde(rename = "questdb")]
    QuestDb(QuestDbConfig),
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Prometheus exposition file written at the end of a run.
    pub textfile_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub simulator: SimulatorConfig,
    pub store: StoreConfig,
    pub metrics: Option<MetricsConfig>,
    #[serde(default)]
    pub devices: Vec<Device>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("SOLAR_SIMULATOR_CONFIG").unwrap_or_else(|_| "solar-simulator.toml".to_string());
        let contents = fs::read_to_string(&path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }

    pub fn device(&self, id: u64) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }
}
