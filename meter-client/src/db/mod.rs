pub mod smart_meter_queries;
