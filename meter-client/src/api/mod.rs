pub mod origin_backend;

pub use origin_backend::OriginBackendClient;
