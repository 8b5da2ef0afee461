pub mod error;
pub mod hashing;
pub mod logger;
pub mod metrics;

pub use error::{IngestError, Result};
pub use hashing::{chunk_id, sha256_hex, table_id};
pub use metrics::{Metrics, MetricsSnapshot};
