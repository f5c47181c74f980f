//! Consumer core - bounded streaming aggregation and alerting
//!
//! # Architecture
//!
//! ```text
//! data file → FileTailTransport → RecordNormalizer
//!     ↓
//! Aggregator (top-K category counts | bounded rolling window)
//!     ↓
//! Snapshot (fresh owned copy per update)
//!     ↓
//! AlertEvaluator (deviation rule)
//!     ↓
//! RenderSink (log | jsonl | tui dashboard)
//! ```

pub mod aggregator;
pub mod alert;
pub mod normalizer;
pub mod pipeline;
pub mod render;
pub mod snapshot_writer;
pub mod transport;
pub mod window;

pub use aggregator::{Aggregator, Snapshot};
pub use alert::{Alert, AlertEvaluator};
pub use normalizer::{Payload, Record, RecordNormalizer, ValidationError};
pub use pipeline::{run_ingestion, ConsumerPipeline};
pub use render::{LogSink, RenderError, RenderSink};
pub use snapshot_writer::JsonlSink;
pub use transport::{FileTailTransport, Transport};
pub use window::{BoundedWindow, CategoryCount, CategoryCounter, RollingStats};
