//! Web form for validating uploaded XML exports
//!
//! Routes:
//! - `GET /` upload form
//! - `POST /validate` multipart upload, answers with an HTML results page
//! - `POST /report` multipart upload, answers with `validation_report.txt`
//! - `GET /health` liveness probe
//!
//! Each upload is spooled to a temporary file that is deleted when the
//! request finishes, whatever the outcome.

use crate::models::ValidationReport;
use crate::parser::XmlError;
use crate::report::REPORT_FILE_NAME;
use crate::utils::logging::truncate_text;
use crate::validator::{DocumentValidator, ValidationError};
use crate::Result;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Multipart field that carries the document
pub const UPLOAD_FIELD: &str = "file";

// =============================================================================
// Application State
// =============================================================================

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<DocumentValidator>,
    pub started_at: String,
}

impl AppState {
    pub fn new(validator: DocumentValidator) -> Self {
        Self {
            validator: Arc::new(validator),
            started_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// An uploaded document
struct Upload {
    file_name: Option<String>,
    bytes: Vec<u8>,
}

/// Why an upload could not be turned into a report
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No XML file was uploaded")]
    MissingFile,

    #[error("Invalid upload: {0}")]
    Multipart(String),

    #[error("Failed to stage upload: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Validation task failed: {0}")]
    Task(String),
}

impl UploadError {
    fn status(&self) -> StatusCode {
        match self {
            UploadError::MissingFile | UploadError::Multipart(_) => StatusCode::BAD_REQUEST,
            UploadError::Validation(ValidationError::Xml(XmlError::Read(..)))
            | UploadError::Io(_)
            | UploadError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            UploadError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = status.as_u16(), error = %self, "upload rejected");
        let page = include_str!("error.html").replace("{{message}}", &escape_html(&self.to_string()));
        (status, Html(page)).into_response()
    }
}

// =============================================================================
// Server Startup
// =============================================================================

/// Build the router; split out from `start_server` so tests can drive it
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/validate", post(handle_validate))
        .route("/report", post(handle_report))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web form server and block until it exits
pub async fn start_server(addr: SocketAddr, state: AppState, max_upload_bytes: usize) -> Result<()> {
    let app = router(state, max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "server listening");
    println!("✓ Server listening on http://{}", addr);
    println!("  Upload form: http://{}/", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// =============================================================================
// Handlers
// =============================================================================

/// Serve the upload form
async fn handle_index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

/// Validate an upload and render the results page
async fn handle_validate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> std::result::Result<Html<String>, UploadError> {
    let upload = read_upload(multipart).await?;
    let report = run_validation(&state, upload).await?;
    Ok(Html(render_results(&report, &state.started_at)))
}

/// Validate an upload and return the text report as a download
async fn handle_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> std::result::Result<Response, UploadError> {
    let upload = read_upload(multipart).await?;
    let report = run_validation(&state, upload).await?;
    let disposition = format!("attachment; filename=\"{}\"", REPORT_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.full_report(),
    )
        .into_response())
}

/// Pull the document out of the multipart body
async fn read_upload(mut multipart: Multipart) -> std::result::Result<Upload, UploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Multipart(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| UploadError::Multipart(e.to_string()))?;
        if bytes.is_empty() {
            return Err(UploadError::MissingFile);
        }
        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Err(UploadError::MissingFile)
}

/// Spool the upload to a temp file and validate it off the async runtime
async fn run_validation(
    state: &AppState,
    upload: Upload,
) -> std::result::Result<ValidationReport, UploadError> {
    let validator = Arc::clone(&state.validator);
    let Upload { file_name, bytes } = upload;
    let size = bytes.len();

    let mut report = tokio::task::spawn_blocking(move || validate_spooled(&validator, &bytes))
        .await
        .map_err(|e| UploadError::Task(e.to_string()))??;

    tracing::info!(
        file = %truncate_text(file_name.as_deref().unwrap_or("-"), 80),
        bytes = size,
        issues = report.has_issues(),
        "validated upload"
    );
    // The spooled path means nothing to the client
    report.source = file_name;
    Ok(report)
}

/// Write bytes to a temporary `.xml` file and validate it from disk
///
/// The temp file is removed when it drops; removal errors are ignored.
fn validate_spooled(
    validator: &DocumentValidator,
    bytes: &[u8],
) -> std::result::Result<ValidationReport, UploadError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("xmlcheck-")
        .suffix(".xml")
        .tempfile()?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    Ok(validator.validate_file(tmp.path())?)
}

// =============================================================================
// Rendering
// =============================================================================

/// Escape text for inclusion in HTML element content and attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_results(report: &ValidationReport, started_at: &str) -> String {
    let status = if report.has_issues() {
        "Issues found"
    } else {
        "No issues found"
    };
    include_str!("results.html")
        .replace("{{file_name}}", &escape_html(report.source.as_deref().unwrap_or("upload.xml")))
        .replace("{{status}}", status)
        .replace("{{report_name}}", REPORT_FILE_NAME)
        .replace("{{started_at}}", &escape_html(started_at))
        .replace("{{sequence}}", &escape_html(&report.sequence_report()))
        .replace("{{options}}", &escape_html(&report.option_report()))
        .replace("{{full_report}}", &escape_html(&report.full_report()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'Paris' & co</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;Paris&#39; &amp; co&lt;/a&gt;"
        );
    }

    #[test]
    fn test_validate_spooled_malformed_is_unprocessable() {
        let validator = DocumentValidator::default();
        let err = validate_spooled(&validator, b"<Root><Question>").unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_validate_spooled_huge_number_is_unprocessable() {
        let validator = DocumentValidator::default();
        let err = validate_spooled(&validator, b"<Root><Question>1000000000000. x</Question></Root>")
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.to_string().contains("exceeds the maximum"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(UploadError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            UploadError::Task("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_render_results_escapes_report() {
        let mut report = DocumentValidator::default()
            .validate_str("<Root><Question>1. Q</Question><Option-2>(a) &lt;b&gt; (b) y (c) z (d) w</Option-2></Root>")
            .unwrap();
        report.source = Some("quiz.xml".into());
        let html = render_results(&report, "2026-01-01 00:00:00");

        assert!(html.contains("quiz.xml"));
        assert!(html.contains("No issues found"));
        assert!(!html.contains("{{"));
        assert!(html.contains("validation_report.txt"));
    }
}
