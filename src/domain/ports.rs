use crate::domain::model::FlushResult;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Destination of flushed batches.
#[async_trait]
pub trait BulkSink: Send + Sync {
    /// POSTs one newline-delimited body and returns the parsed outcome.
    async fn send_bulk(&self, body: String) -> Result<FlushResult>;

    /// Sinks that own stdout push progress output over to stderr.
    fn writes_to_stdout(&self) -> bool {
        false
    }
}
