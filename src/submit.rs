//! Remote submission of a report as multipart form data

use crate::error::{Result, SubmitError};
use crate::types::{FieldValue, ProgressCallback, Report, progress};
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{info, warn};

/// Whether a response status counts as a successful submission
///
/// Anything in `[200, 400)` is accepted, redirects included.
pub fn is_success_status(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Render a report as a multipart form, preserving field order
pub fn report_to_form(report: Report) -> Result<Form> {
    let mut form = Form::new();
    for field in report.into_fields() {
        form = match field.value {
            FieldValue::Text(text) => form.text(field.name, text),
            FieldValue::Blob { file_name, bytes } => {
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str("application/octet-stream")
                    .map_err(SubmitError::Transport)?;
                form.part(field.name, part)
            }
        };
    }
    Ok(form)
}

/// POST `report` to `endpoint` once
///
/// Fails without touching the network when `endpoint` is empty or cannot be
/// parsed. `progress` is told when the server starts answering. There is no
/// retry: the first failure is returned.
pub async fn submit_report(
    client: &reqwest::Client,
    endpoint: &str,
    report: Report,
    progress: Option<&ProgressCallback>,
    timeout: Duration,
) -> Result<()> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(SubmitError::NoEndpoint.into());
    }
    let url = url::Url::parse(endpoint).map_err(|e| SubmitError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;

    let fields = report.len();
    let form = report_to_form(report)?;

    info!(endpoint = %url, fields, "submitting bug report");
    let request = client.post(url.clone()).multipart(form).timeout(timeout);

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => return Err(transport_error(e, timeout, &url).into()),
    };

    if let Some(callback) = progress {
        callback.call(progress::WAITING_FOR_RESPONSE);
    }

    let status = response.status().as_u16();
    // Drain the body so the request only completes once the server is done.
    if let Err(e) = response.bytes().await {
        return Err(transport_error(e, timeout, &url).into());
    }

    if !is_success_status(status) {
        warn!(endpoint = %url, status, "bug report rejected");
        return Err(SubmitError::HttpStatus { status }.into());
    }

    info!(endpoint = %url, status, "bug report submitted");
    Ok(())
}

fn transport_error(e: reqwest::Error, timeout: Duration, url: &url::Url) -> SubmitError {
    if e.is_timeout() {
        warn!(endpoint = %url, timeout = ?timeout, "bug report submission timed out");
        SubmitError::TimedOut { after: timeout }
    } else {
        warn!(endpoint = %url, error = %e, "bug report submission failed");
        SubmitError::Transport(e)
    }
}
