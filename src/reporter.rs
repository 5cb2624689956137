//! Bug report entry points
//!
//! [`BugReporter`] runs the builder and one dispatcher per call, driving a
//! fresh [`DispatchStateMachine`] and broadcasting every state change and
//! progress label as a [`ReportEvent`].

use crate::archive::{DirectorySink, DownloadSink, download_locally};
use crate::builder::ReportBuilder;
use crate::config::Config;
use crate::dispatch::DispatchStateMachine;
use crate::error::{Result, SubmitError};
use crate::providers::Collaborators;
use crate::submit::submit_report;
use crate::types::{BugReportOptions, ProgressCallback, Report, ReportEvent, progress};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

enum Destination<'a> {
    Remote(&'a str),
    Local(&'a dyn DownloadSink),
}

/// Builds bug reports and sends or downloads them
///
/// Cheap to clone; clones share the HTTP client and event channel.
///
/// # Example
///
/// ```no_run
/// use rageshake::{BugReporter, BugReportOptions, Config};
/// use rageshake::providers::{Collaborators, DirectoryLogSource, StaticVersion};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let reporter = BugReporter::new(
///     Config::default(),
///     Collaborators::new(
///         Arc::new(StaticVersion::new("1.6.0")),
///         Arc::new(DirectoryLogSource::new("/var/log/riot")),
///     ),
/// )?;
///
/// reporter
///     .send_bug_report(
///         "https://rageshakes.example.org/api/submit",
///         BugReportOptions::with_logs("crash on send"),
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BugReporter {
    config: Arc<Config>,
    builder: ReportBuilder,
    client: reqwest::Client,
    event_tx: broadcast::Sender<ReportEvent>,
}

impl BugReporter {
    /// Create a reporter
    ///
    /// # Errors
    ///
    /// Fails if `config` is invalid or the HTTP client cannot be created.
    pub fn new(config: Config, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(SubmitError::Transport)?;
        let (event_tx, _) = broadcast::channel(64);
        Ok(Self {
            builder: ReportBuilder::new(config.app_name.clone(), collaborators),
            config: Arc::new(config),
            client,
            event_tx,
        })
    }

    /// Subscribe to state changes and progress labels
    pub fn subscribe(&self) -> broadcast::Receiver<ReportEvent> {
        self.event_tx.subscribe()
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build a report without dispatching it
    pub async fn build_report(&self, options: &BugReportOptions) -> Result<Report> {
        self.builder.build(options).await
    }

    /// Build a report and POST it to `endpoint`
    ///
    /// Fails before building anything if `endpoint` is empty.
    pub async fn send_bug_report(&self, endpoint: &str, options: BugReportOptions) -> Result<()> {
        if endpoint.trim().is_empty() {
            warn!("bug report requested without an endpoint");
            return Err(SubmitError::NoEndpoint.into());
        }
        self.run(options, Destination::Remote(endpoint)).await
    }

    /// Send to the configured `bug_report_endpoint`
    pub async fn send_configured_bug_report(&self, options: BugReportOptions) -> Result<()> {
        let endpoint = self.config.bug_report_endpoint.clone().unwrap_or_default();
        self.send_bug_report(&endpoint, options).await
    }

    /// Build a report and hand it to `sink` as a tar archive
    pub async fn download_bug_report(
        &self,
        options: BugReportOptions,
        sink: &dyn DownloadSink,
    ) -> Result<()> {
        self.run(options, Destination::Local(sink)).await
    }

    /// Build a report and save it as a tar archive in `dir`
    ///
    /// An existing file of the same name is handled per
    /// `Config::download_collision`.
    pub async fn download_bug_report_to_dir(
        &self,
        options: BugReportOptions,
        dir: impl Into<PathBuf>,
    ) -> Result<()> {
        let sink = DirectorySink::from_config(dir, &self.config);
        self.download_bug_report(options, &sink).await
    }

    async fn run(&self, mut options: BugReportOptions, destination: Destination<'_>) -> Result<()> {
        let callback = self.progress_callback(options.progress.take());
        options.progress = Some(callback.clone());

        let mut machine = DispatchStateMachine::default();
        self.emit_state(machine.start_building()?);

        let report = match self.builder.build(&options).await {
            Ok(report) => report,
            Err(e) => return Err(self.fail(&mut machine, e)),
        };

        self.emit_state(machine.start_dispatching()?);
        let result = match destination {
            Destination::Remote(endpoint) => {
                callback.call(progress::UPLOADING);
                submit_report(
                    &self.client,
                    endpoint,
                    report,
                    Some(&callback),
                    self.config.submit_timeout,
                )
                .await
            }
            Destination::Local(sink) => {
                download_locally(report, Some(&callback), sink, &self.config.archive_file_name)
                    .await
            }
        };

        match result {
            Ok(()) => {
                self.emit_state(machine.finish()?);
                info!("bug report dispatched");
                Ok(())
            }
            Err(e) => Err(self.fail(&mut machine, e)),
        }
    }

    fn progress_callback(&self, user: Option<ProgressCallback>) -> ProgressCallback {
        let event_tx = self.event_tx.clone();
        ProgressCallback::new(move |message| {
            event_tx
                .send(ReportEvent::Progress {
                    message: message.to_string(),
                })
                .ok();
            if let Some(user) = &user {
                user.call(message);
            }
        })
    }

    fn fail(&self, machine: &mut DispatchStateMachine, error: crate::Error) -> crate::Error {
        let cause = error.to_string();
        warn!(error = %cause, "bug report failed");
        if let Ok(state) = machine.fail(cause.clone()) {
            self.emit_state(state);
        }
        self.event_tx.send(ReportEvent::Failed { error: cause }).ok();
        error
    }

    fn emit_state(&self, state: crate::types::DispatchState) {
        self.event_tx.send(ReportEvent::StateChanged { state }).ok();
    }
}

impl std::fmt::Debug for BugReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BugReporter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileCollisionAction;
    use crate::error::{ArchiveError, Error};
    use crate::providers::{LogSource, StaticVersion};
    use crate::types::{DispatchState, LogSegment};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedLogs(Vec<LogSegment>);

    #[async_trait]
    impl LogSource for FixedLogs {
        async fn logs_for_report(&self) -> Result<Vec<LogSegment>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn reporter(config: Config) -> BugReporter {
        BugReporter::new(
            config,
            Collaborators::new(
                Arc::new(StaticVersion::new("1.6.0")),
                Arc::new(FixedLogs(vec![LogSegment::new("a", "hello")])),
            ),
        )
        .unwrap()
    }

    fn drain(rx: &mut broadcast::Receiver<ReportEvent>) -> Vec<ReportEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn states(events: &[ReportEvent]) -> Vec<DispatchState> {
        events
            .iter()
            .filter_map(|e| match e {
                ReportEvent::StateChanged { state } => Some(*state),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_send_success_events() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let reporter = reporter(Config::default());
        let mut rx = reporter.subscribe();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let options = BugReportOptions {
            user_text: "crash on send".into(),
            send_logs: true,
            progress: Some(ProgressCallback::new(move |m| {
                sink.lock().unwrap().push(m.to_string())
            })),
            ..Default::default()
        };

        reporter
            .send_bug_report(&mock_server.uri(), options)
            .await
            .unwrap();

        let events = drain(&mut rx);
        assert_eq!(states(&events), [
            DispatchState::Building,
            DispatchState::Dispatching,
            DispatchState::Done,
        ]);
        assert_eq!(*seen.lock().unwrap(), [
            progress::COLLECTING_VERSION,
            progress::COLLECTING_LOGS,
            progress::UPLOADING,
            progress::WAITING_FOR_RESPONSE,
        ]);
    }

    #[tokio::test]
    async fn test_send_failure_reaches_failed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let reporter = reporter(Config::default());
        let mut rx = reporter.subscribe();

        let err = reporter
            .send_bug_report(&mock_server.uri(), BugReportOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500");

        let events = drain(&mut rx);
        assert_eq!(states(&events), [
            DispatchState::Building,
            DispatchState::Dispatching,
            DispatchState::Failed,
        ]);
        assert!(events.contains(&ReportEvent::Failed {
            error: "HTTP 500".into()
        }));
    }

    #[tokio::test]
    async fn test_empty_endpoint_never_builds() {
        let reporter = reporter(Config::default());
        let mut rx = reporter.subscribe();

        let result = reporter
            .send_bug_report("", BugReportOptions::default())
            .await;
        assert!(matches!(result, Err(Error::Submit(SubmitError::NoEndpoint))));

        let result = reporter
            .send_configured_bug_report(BugReportOptions::default())
            .await;
        assert!(matches!(result, Err(Error::Submit(SubmitError::NoEndpoint))));

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_configured_endpoint_used() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let reporter = reporter(Config {
            bug_report_endpoint: Some(mock_server.uri()),
            ..Default::default()
        });
        reporter
            .send_configured_bug_report(BugReportOptions::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_download_writes_archive() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = reporter(Config::default());
        let mut rx = reporter.subscribe();
        let sink = DirectorySink::new(temp_dir.path());

        reporter
            .download_bug_report(BugReportOptions::with_logs("x"), &sink)
            .await
            .unwrap();

        let bytes = std::fs::read(temp_dir.path().join("rageshake.tar")).unwrap();
        let mut archive = tar::Archive::new(&bytes[..]);
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["log-0.log", "issue.txt"]);

        let events = drain(&mut rx);
        assert_eq!(states(&events).last(), Some(&DispatchState::Done));
        assert!(events.contains(&ReportEvent::Progress {
            message: progress::DOWNLOADING.into()
        }));
    }

    #[tokio::test]
    async fn test_download_to_dir_uses_configured_collision() {
        let temp_dir = TempDir::new().unwrap();
        let existing = temp_dir.path().join("rageshake.tar");
        std::fs::write(&existing, b"old").unwrap();

        let reporter = reporter(Config {
            download_collision: FileCollisionAction::Skip,
            ..Default::default()
        });
        let mut rx = reporter.subscribe();

        let result = reporter
            .download_bug_report_to_dir(BugReportOptions::default(), temp_dir.path())
            .await;

        assert!(matches!(
            result,
            Err(Error::Archive(ArchiveError::FileCollision { .. }))
        ));
        assert_eq!(std::fs::read(&existing).unwrap(), b"old");
        assert!(!temp_dir.path().join("rageshake (1).tar").exists());
        assert_eq!(states(&drain(&mut rx)).last(), Some(&DispatchState::Failed));
    }

    #[tokio::test]
    async fn test_download_to_dir_renames_by_default() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("rageshake.tar"), b"old").unwrap();

        reporter(Config::default())
            .download_bug_report_to_dir(BugReportOptions::default(), temp_dir.path())
            .await
            .unwrap();

        assert!(temp_dir.path().join("rageshake (1).tar").exists());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = BugReporter::new(
            Config {
                archive_file_name: " ".into(),
                ..Default::default()
            },
            Collaborators::new(
                Arc::new(StaticVersion::new("1")),
                Arc::new(FixedLogs(Vec::new())),
            ),
        );
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
