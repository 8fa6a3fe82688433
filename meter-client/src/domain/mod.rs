mod device;
mod smart_meter_read;

pub use device::Device;
pub use smart_meter_read::SmartMeterRead;
