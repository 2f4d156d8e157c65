//! Lunaris client engine: typed HTTP client and effect execution.
mod client;
mod engine;
mod lines;
mod persist;
mod types;

pub use client::{results_file_name, PredictorClient};
pub use engine::{EngineCommand, EngineConfig, EngineEvent, EngineHandle};
pub use lines::{LineSink, LineSplitter};
pub use persist::{ensure_output_dir, AtomicFileWrite, AtomicFileWriter, PersistError};
pub use types::{
    ClientError, ClientSettings, JobId, JobStatus, SchemaResponse, SessionData, SessionJobRef,
};
