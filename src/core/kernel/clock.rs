use crate::core::errors::FtxError;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of request timestamps. Read once per signed call, immediately before signing.
pub trait Clock: Send + Sync {
    fn timestamp_ms(&self) -> Result<u64, FtxError>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn timestamp_ms(&self) -> Result<u64, FtxError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .map_err(|e| FtxError::AuthError(format!("Failed to get timestamp: {}", e)))
    }
}
