use crate::utils::error::Result;

/// Durable string-keyed storage, the crate's stand-in for the browser's
/// localStorage: process-wide, survives restarts, no TTL.
///
/// Reads of missing keys return `Ok(None)`. Implementations must make each
/// `set` atomic per key (a write is either fully applied or not observed);
/// no coordination between concurrent writers is required.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<String>>> + Send;
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}
