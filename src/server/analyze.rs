//! Upload analysis endpoint

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipeline;
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Per-file outcome in an analysis batch
#[derive(Debug, Serialize)]
pub struct FileResult {
    pub filename: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    fn reviewed(filename: String, review: pipeline::FileReview) -> Self {
        Self {
            filename,
            report: Some(review.report),
            fixed_code: Some(review.fixed_code),
            error: None,
        }
    }

    fn failed(filename: String, error: String) -> Self {
        Self {
            filename,
            report: None,
            fixed_code: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub results: Vec<FileResult>,

    /// Set when the batch stopped early because every API key was rate
    /// limited; files after the halt were not analyzed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted: Option<String>,

    pub generated_at: DateTime<Utc>,
}

/// POST /analyze
///
/// Accepts a multipart upload, filters to analyzable files outside the
/// skip folders, and runs the audit pipeline per file. Non-terminal
/// failures are recorded per file; pool exhaustion halts the batch.
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AnalyzeResponse>), ApiError> {
    // Collect eligible uploads first so an empty batch fails fast
    let mut files: Vec<(String, Result<String, String>)> = Vec::new();
    let mut skipped = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(e.to_string()))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Upload(format!("failed to read {}: {}", filename, e)))?;

        if !state.settings.is_analyzable(&filename) || state.filter.should_skip(&filename) {
            skipped += 1;
            continue;
        }

        let content = String::from_utf8(data.to_vec())
            .map_err(|_| format!("{} is not valid UTF-8", filename));
        files.push((filename, content));
    }

    if files.is_empty() {
        return Err(ApiError::NoEligibleFiles);
    }

    tracing::info!(files = files.len(), skipped, "starting analysis batch");

    let mut results = Vec::with_capacity(files.len());
    let mut halted: Option<String> = None;

    let mut client = state.client.lock().await;
    // Each batch starts a fresh rotation cycle from the first key
    client.reset();

    for (filename, content) in files {
        let content = match content {
            Ok(content) => content,
            Err(message) => {
                results.push(FileResult::failed(filename, message));
                continue;
            }
        };

        match pipeline::review_code(&mut client, &content).await {
            Ok(review) => results.push(FileResult::reviewed(filename, review)),
            Err(err) if err.is_keys_exhausted() => {
                tracing::error!(file = %filename, error = %err, "halting batch");
                halted = Some(err.to_string());
                results.push(FileResult::failed(filename, err.to_string()));
                break;
            }
            Err(err) => {
                tracing::warn!(file = %filename, error = %err, "file analysis failed");
                results.push(FileResult::failed(filename, err.to_string()));
            }
        }
    }
    drop(client);

    {
        let mut stats = state.stats.write();
        stats.batches += 1;
        stats.files_reviewed += results.iter().filter(|r| r.error.is_none()).count() as u64;
        stats.files_failed += results.iter().filter(|r| r.error.is_some()).count() as u64;
    }

    // A batch that produced nothing before exhaustion is a service-side
    // failure; partial batches still return their results.
    let any_reviewed = results.iter().any(|r| r.error.is_none());
    let status = if halted.is_some() && !any_reviewed {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(AnalyzeResponse {
            results,
            halted,
            generated_at: Utc::now(),
        }),
    ))
}
