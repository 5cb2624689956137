//! Core types for rageshake

use std::fmt;
use std::sync::Arc;

/// Field name shared by every compressed log attachment
pub const COMPRESSED_LOG_FIELD: &str = "compressed-log";

/// Value recorded when an environment probe fails
pub const UNKNOWN: &str = "UNKNOWN";

/// Text sent when the user leaves the description empty
pub const DEFAULT_USER_TEXT: &str = "User did not supply any additional text.";

/// Value of a single report field
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    /// Plain text metadata
    Text(String),
    /// Binary attachment with a synthetic file name
    Blob {
        /// File name the attachment is sent under
        file_name: String,
        /// Attachment contents
        bytes: Vec<u8>,
    },
}

/// A named field in a [`Report`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportField {
    /// Field name (not unique: every log is a `compressed-log`)
    pub name: String,
    /// Field value
    pub value: FieldValue,
}

impl ReportField {
    /// Text value, if this is a text field
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            FieldValue::Text(text) => Some(text),
            FieldValue::Blob { .. } => None,
        }
    }

    /// Whether this field carries binary data
    pub fn is_blob(&self) -> bool {
        matches!(self.value, FieldValue::Blob { .. })
    }
}

/// Ordered collection of report fields
///
/// Built fresh for each invocation and moved into exactly one dispatcher.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    fields: Vec<ReportField>,
}

impl Report {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field
    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(ReportField {
            name: name.into(),
            value: FieldValue::Text(value.into()),
        });
    }

    /// Append a binary field
    pub fn push_blob(
        &mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) {
        self.fields.push(ReportField {
            name: name.into(),
            value: FieldValue::Blob {
                file_name: file_name.into(),
                bytes,
            },
        });
    }

    /// Fields in insertion order
    pub fn fields(&self) -> &[ReportField] {
        &self.fields
    }

    /// Consume the report, yielding its fields in insertion order
    pub fn into_fields(self) -> Vec<ReportField> {
        self.fields
    }

    /// First text value recorded under `name`
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .filter(|f| f.name == name)
            .find_map(ReportField::text)
    }

    /// Whether any field is named `name`
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Binary fields in insertion order
    pub fn blobs(&self) -> impl Iterator<Item = &ReportField> {
        self.fields.iter().filter(|f| f.is_blob())
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the report has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One named unit of raw log text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSegment {
    /// Identifier of the source log, used as the attachment file name
    pub id: String,
    /// Raw log text
    pub lines: String,
}

impl LogSegment {
    /// Create a log segment
    pub fn new(id: impl Into<String>, lines: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            lines: lines.into(),
        }
    }
}

/// Storage usage as reported by the host
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StorageEstimate {
    /// Bytes available to the client
    pub quota: u64,
    /// Bytes currently used
    pub usage: u64,
    /// Usage broken down by category, in the order the host reported it
    pub usage_details: Vec<(String, u64)>,
}

/// Callback receiving human-readable progress labels
#[derive(Clone)]
pub struct ProgressCallback(Arc<dyn Fn(&str) + Send + Sync>);

impl ProgressCallback {
    /// Wrap a closure
    pub fn new(f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Report a progress label
    pub fn call(&self, message: &str) {
        (self.0)(message)
    }
}

impl fmt::Debug for ProgressCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressCallback")
    }
}

/// Options for a single bug report
#[derive(Clone, Debug, Default)]
pub struct BugReportOptions {
    /// Free-form description from the user (empty = [`DEFAULT_USER_TEXT`])
    pub user_text: String,
    /// Attach compressed logs
    pub send_logs: bool,
    /// Short label used to triage the report (empty = no label)
    pub label: Option<String>,
    /// Progress callback
    pub progress: Option<ProgressCallback>,
}

impl BugReportOptions {
    /// Options with the given user text and logs attached
    pub fn with_logs(user_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            send_logs: true,
            ..Default::default()
        }
    }

    pub(crate) fn report_progress(&self, message: &str) {
        if let Some(progress) = &self.progress {
            progress.call(message);
        }
    }
}

/// Progress labels emitted while building and dispatching a report
pub mod progress {
    /// Before the app version lookup
    pub const COLLECTING_VERSION: &str = "Collecting app version information";
    /// Before log collection
    pub const COLLECTING_LOGS: &str = "Collecting logs";
    /// Before the submit request is sent
    pub const UPLOADING: &str = "Uploading report";
    /// Once the server has started answering
    pub const WAITING_FOR_RESPONSE: &str = "Waiting for response from server";
    /// Before the local archive is assembled
    pub const DOWNLOADING: &str = "Downloading report";
}

/// Lifecycle of a single report dispatch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchState {
    /// Nothing started yet
    Idle,
    /// Gathering metadata and logs
    Building,
    /// Uploading or archiving
    Dispatching,
    /// Finished successfully
    Done,
    /// Finished with an error
    Failed,
}

impl DispatchState {
    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, DispatchState::Done | DispatchState::Failed)
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DispatchState::Idle => "idle",
            DispatchState::Building => "building",
            DispatchState::Dispatching => "dispatching",
            DispatchState::Done => "done",
            DispatchState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Events broadcast by [`BugReporter`](crate::BugReporter)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportEvent {
    /// The dispatch moved to a new state
    StateChanged {
        /// New state
        state: DispatchState,
    },
    /// A progress label was reported
    Progress {
        /// Human-readable label
        message: String,
    },
    /// The dispatch failed
    Failed {
        /// Human-readable cause
        error: String,
    },
}
