pub mod config;
pub mod dataset;
pub mod metrics_textfile;
pub mod observability;
pub mod runner;
pub mod store;
pub mod synthesis;
pub mod validation;
pub mod worker;

pub use dataset::SeasonalDataset;
pub use worker::{run_worker, PersistOutcome, WorkerReport, WorkerSettings};
