pub mod api;
pub mod db;
pub mod domain;
pub mod error;

pub use api::OriginBackendClient;
pub use domain::{Device, SmartMeterRead};
pub use error::{ClientError, ClientResult};
