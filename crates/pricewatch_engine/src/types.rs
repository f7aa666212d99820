use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type SessionToken = u64;
pub type RequestId = u64;

/// Job status as classified from the wire string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteJobStatus {
    Idle,
    Running,
    Completed,
    Error,
}

/// Body of `GET /api/scrape/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusReport {
    pub status: String,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub current_product: String,
}

impl JobStatusReport {
    /// Anything that is not idle, running or error counts as completed.
    pub fn kind(&self) -> RemoteJobStatus {
        match self.status.to_ascii_lowercase().as_str() {
            "idle" => RemoteJobStatus::Idle,
            "running" => RemoteJobStatus::Running,
            "error" => RemoteJobStatus::Error,
            _ => RemoteJobStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    /// 0 means no limit.
    pub days: u32,
    pub active_only: bool,
}

/// One product's price history keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub store: String,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub history: BTreeMap<String, Option<f64>>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub store: String,
    pub url: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_size: Option<f64>,
}

/// Partial update; unset fields are left alone by the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_size: Option<f64>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self == &ProductUpdate::default()
    }
}

/// Fields the service leaves out fall back to [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enabled_stores: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled_stores: vec![
                "nofrills".to_string(),
                "foodbasics".to_string(),
                "metro".to_string(),
            ],
        }
    }
}

/// A single price observation committed to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub product_id: String,
    pub store: String,
    pub product_name: String,
    pub price: f64,
    pub currency: String,
    pub stock: bool,
    pub unit: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub standard_unit: Option<String>,
    pub url: String,
}

/// Successful payload of a test scrape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReading {
    pub product_id: String,
    pub product_name: String,
    pub store: String,
    pub extracted_price: f64,
    pub currency: String,
    #[serde(default)]
    pub raw_weight: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub standard_unit: Option<String>,
    pub url: String,
}

impl TestReading {
    pub fn into_reading(self) -> Reading {
        Reading {
            product_id: self.product_id,
            store: self.store,
            product_name: self.product_name,
            price: self.extracted_price,
            currency: self.currency,
            stock: true,
            unit: self.unit,
            quantity: self.quantity,
            unit_price: self.unit_price,
            standard_unit: self.standard_unit,
            url: self.url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TestOutcome {
    Success { data: TestReading },
    Error { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    StartFinished(Result<(), ApiError>),
    StatusReceived {
        token: SessionToken,
        result: Result<JobStatusReport, ApiError>,
    },
    Tick {
        token: SessionToken,
    },
    GraceElapsed {
        token: SessionToken,
    },
    HistoryReceived {
        request: RequestId,
        result: Result<Vec<HistoryEntry>, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::error::Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            // The server already phrased it for humans.
            FailureKind::Rejected(_) => write!(f, "{}", self.message),
            _ => write!(f, "{} ({})", self.kind, self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// Non-2xx without a readable `detail`.
    HttpStatus(u16),
    /// Non-2xx with a `detail` message.
    Rejected(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Rejected(code) => write!(f, "rejected with status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response body"),
        }
    }
}
