// Adapters layer: concrete implementations for the external collaborators
// (remote REST API, durable key-value storage).

pub mod api;
pub mod storage;
