//! Pricewatch engine: HTTP client for the tracker service and effect execution.
mod client;
mod engine;
mod persist;
mod types;

pub use client::{ApiSettings, ReqwestApi, TrackerApi};
pub use engine::{EngineCommand, EngineHandle};
pub use persist::{ensure_export_dir, write_export, PersistError};
pub use types::{
    ApiError, EngineEvent, FailureKind, HistoryEntry, HistoryQuery, JobStatusReport, Product,
    ProductUpdate, Reading, RemoteJobStatus, RequestId, SessionToken, Settings, TestOutcome,
    TestReading,
};
