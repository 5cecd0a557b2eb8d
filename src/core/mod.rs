pub mod batch;
pub mod etl;
pub mod reader;
pub mod reconcile;
pub mod template;
pub mod transport;

pub use crate::domain::model::{FlushResult, HeaderList, ImportSummary, Record, RenderedPair};
pub use crate::domain::ports::BulkSink;
pub use crate::utils::error::Result;
