//! Core data models for the column picker

use serde::{Deserialize, Serialize};

/// MIME type attached to the uploaded file part
pub const UPLOAD_MIME: &str = "text/csv; charset=utf-8";

/// MIME type of the document produced from a successful response
pub const DOCUMENT_MIME: &str = "text/csv";

/// Which container a column item currently lives in

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ColumnSide {
    Available,

    Chosen,
}

impl ColumnSide {
    pub fn other(self) -> Self {
        match self {
            ColumnSide::Available => ColumnSide::Chosen,
            ColumnSide::Chosen => ColumnSide::Available,
        }
    }
}

/// Lifecycle phase of the picker

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PickerPhase {
    /// No file with a detected delimiter has been loaded
    Idle,

    /// Headers parsed, submit enabled
    Loaded,

    /// A submission is in flight
    Submitting,
}

/// Where a file entered the picker

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IntakeKind {
    Drop,

    Browse,
}

/// Monotonic ticket identifying one file load; stale tickets are discarded
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(pub u64);

/// Ticket identifying one submission
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SubmitTicket(pub u64);

/// Payload handed to the HTTP submitter

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionPayload {
    /// Raw bytes of the loaded file, re-read at submit time
    #[serde(skip)]
    pub data: Vec<u8>,

    /// File name used for the `data` part
    pub file_name: String,

    /// Chosen columns in visual order
    pub columns: Vec<String>,

    pub match_all: bool,
}

impl SubmissionPayload {
    /// Form fields other than the file part, in wire order
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields: Vec<(&'static str, String)> = self
            .columns
            .iter()
            .map(|column| ("columns", column.clone()))
            .collect();
        fields.push(("match_all", self.match_all.to_string()));
        fields
    }
}

/// Raw response of a submission

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub status: u16,

    pub body: String,
}

/// CSV document produced by a successful submission

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CsvDocument {
    pub id: String,

    pub mime_type: String,

    pub content: String,

    pub received_at: chrono::DateTime<chrono::Utc>,
}

impl CsvDocument {
    pub fn from_body(body: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            mime_type: DOCUMENT_MIME.to_string(),
            content: body,
            received_at: chrono::Utc::now(),
        }
    }
}

/// Header preview of a CSV file

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderPreview {
    pub headers: Vec<String>,

    pub delimiter: Option<char>,

    pub rows: Vec<Vec<String>>,

    pub total_rows: usize,

    pub encoding: String,
}

/// Point-in-time view of the picker for front ends

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickerSnapshot {
    pub phase: PickerPhase,

    pub file_name: Option<String>,

    pub delimiter: Option<char>,

    pub available: Vec<String>,

    pub chosen: Vec<String>,

    pub match_all: bool,

    pub submit_enabled: bool,

    pub holder_hover: bool,

    pub chosen_hover: bool,
}

/// Notifications broadcast to front ends

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PickerNotification {
    Loaded {
        ticket: LoadTicket,
        headers: Vec<String>,
        delimiter: char,
    },

    LoadAborted {
        ticket: LoadTicket,
        reason: String,
    },

    SubmitSucceeded {
        ticket: SubmitTicket,
        document: CsvDocument,
        location: Option<String>,
    },

    SubmitFailed {
        ticket: SubmitTicket,
        message: String,
    },
}

/// Application error types

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Submit error: {0}")]
    Submit(String),

    #[error("System error: {0}")]
    System(String),
}

/// Result type alias for application operations

pub type AppResult<T> = Result<T, AppError>;
