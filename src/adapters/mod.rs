// Adapters layer: concrete implementations for external systems (http geocoding, storage).

pub mod geocoding;
pub mod storage;
