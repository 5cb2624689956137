//! # rageshake
//!
//! Bug report ("rageshake") collection for chat clients, plus the state
//! machine behind an avatar upload control.
//!
//! ## Design Philosophy
//!
//! - **Injected collaborators** - version, logs, identity, feature flags and
//!   environment probes are traits, never globals
//! - **Degrade, don't fail** - metadata probes that fail become `UNKNOWN` or
//!   are omitted; only log collection can abort a report
//! - **One attempt** - no retries anywhere; every failure is returned to the caller
//! - **Event-driven** - consumers subscribe to state changes and progress labels
//!
//! ## Quick Start
//!
//! ```no_run
//! use rageshake::{BugReporter, BugReportOptions, Config};
//! use rageshake::providers::{Collaborators, DirectoryLogSource, StaticVersion};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         bug_report_endpoint: Some("https://rageshakes.example.org/api/submit".to_string()),
//!         ..Default::default()
//!     };
//!     let reporter = BugReporter::new(
//!         config,
//!         Collaborators::new(
//!             Arc::new(StaticVersion::new("1.6.0")),
//!             Arc::new(DirectoryLogSource::new("/var/log/riot")),
//!         ),
//!     )?;
//!
//!     // Subscribe to events
//!     let mut events = reporter.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let options = BugReportOptions::with_logs("Messages fail to send");
//!     if reporter.send_configured_bug_report(options.clone()).await.is_err() {
//!         // Fall back to saving the report locally
//!         reporter.download_bug_report_to_dir(options, ".").await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Local tar archive download
pub mod archive;
/// Avatar upload widget state
pub mod avatar;
/// Report building
pub mod builder;
/// gzip helpers
pub mod compression;
/// Configuration types
pub mod config;
/// Dispatch lifecycle state machine
pub mod dispatch;
/// Error types
pub mod error;
/// Collaborator traits and simple implementations
pub mod providers;
/// Bug report entry points
pub mod reporter;
/// Remote multipart submission
pub mod submit;
/// Core types and events
pub mod types;
/// Path helpers
pub mod utils;

// Re-export commonly used types
pub use archive::{DirectorySink, DownloadSink, LocalDownload};
pub use avatar::{AvatarFile, AvatarPhase, AvatarTarget, ChangeAvatar, MediaRepository};
pub use builder::ReportBuilder;
pub use config::{Config, FileCollisionAction};
pub use dispatch::DispatchStateMachine;
pub use error::{ArchiveError, AvatarError, Error, Result, SubmitError};
pub use reporter::BugReporter;
pub use types::{
    BugReportOptions, DispatchState, FieldValue, LogSegment, ProgressCallback, Report,
    ReportEvent, ReportField, StorageEstimate,
};
