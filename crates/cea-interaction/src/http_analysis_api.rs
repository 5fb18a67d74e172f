//! HttpAnalysisApi - reqwest implementation of the analysis service port.
//!
//! The client holds no credential state. Each call receives the current
//! session and attaches `Authorization: Bearer <token>` itself, so a logout
//! takes effect on the very next request.

use async_trait::async_trait;
use cea_core::analysis::{DatasetSummary, LatestSummary, UploadFile, UploadResult};
use cea_core::api::{AnalysisApi, Credentials, LoginGrant, Registration, ReportPayload};
use cea_core::config::ClientConfig;
use cea_core::error::{CeaError, Result};
use cea_core::report::DEFAULT_REPORT_EXTENSION;
use cea_core::session::Session;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Multipart field the upload endpoint reads the dataset from.
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
struct HistoryEnvelope {
    #[serde(default)]
    datasets: Vec<DatasetSummary>,
}

/// Error body shapes returned by the service: `{"error": ...}` from the
/// analysis views, `{"detail": ...}` from the auth layer.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    detail: Option<String>,
}

/// How a non-success status is classified for one endpoint.
#[derive(Debug, Clone, Copy)]
enum Failure<'a> {
    /// login / register: client errors are credential rejections
    Credentials,
    /// 404 means the named entity is missing
    Missing(&'static str, &'a str),
    Plain,
}

/// Analysis service reached over HTTP.
#[derive(Clone)]
pub struct HttpAnalysisApi {
    client: Client,
    base_url: String,
    request_timeout: Duration,
    report_timeout: Duration,
}

impl HttpAnalysisApi {
    /// Creates a client for the service described by `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .build()
            .map_err(|e| CeaError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            report_timeout: Duration::from_secs(config.report_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins the base URL and an endpoint path such as `login/`.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn login_request(&self, credentials: &Credentials) -> RequestBuilder {
        self.client
            .post(self.endpoint("login/"))
            .timeout(self.request_timeout)
            .json(credentials)
    }

    fn register_request(&self, registration: &Registration) -> RequestBuilder {
        self.client
            .post(self.endpoint("register/"))
            .timeout(self.request_timeout)
            .json(registration)
    }

    fn upload_request(&self, session: Option<&Session>, file: &UploadFile) -> Result<RequestBuilder> {
        let mime = mime_guess::from_path(&file.name).first_or_octet_stream();
        let part = Part::bytes(file.contents.clone())
            .file_name(file.name.clone())
            .mime_str(mime.as_ref())
            .map_err(|e| CeaError::internal(format!("Invalid upload content type: {}", e)))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let builder = self
            .client
            .post(self.endpoint("upload/"))
            .timeout(self.request_timeout)
            .multipart(form);
        Ok(authorize(builder, session))
    }

    fn get_request(&self, session: Option<&Session>, path: &str, timeout: Duration) -> RequestBuilder {
        let builder = self.client.get(self.endpoint(path)).timeout(timeout);
        authorize(builder, session)
    }
}

/// Attaches the bearer credential when a session exists.
fn authorize(builder: RequestBuilder, session: Option<&Session>) -> RequestBuilder {
    match session {
        Some(session) => builder.header(AUTHORIZATION, session.bearer()),
        None => builder,
    }
}

async fn send(builder: RequestBuilder, operation: &str) -> Result<Response> {
    builder.send().await.map_err(|e| request_error(operation, &e))
}

fn request_error(operation: &str, err: &reqwest::Error) -> CeaError {
    let detail = if err.is_timeout() {
        format!("{} request timed out: {}", operation, err)
    } else if err.is_connect() {
        format!("{} could not reach the service: {}", operation, err)
    } else {
        format!("{} request failed: {}", operation, err)
    };
    CeaError::Transport {
        status: err.status().map(|s| s.as_u16()),
        message: None,
        detail,
    }
}

/// Extracts the service-provided error text from a response body.
fn error_text(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error
        .or(parsed.detail)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Maps a non-success response onto the shared error kinds.
fn classify(status: StatusCode, body: &str, failure: Failure<'_>) -> CeaError {
    let message = error_text(body);

    if status == StatusCode::UNAUTHORIZED {
        return CeaError::auth(Some(status.as_u16()), message);
    }

    match failure {
        Failure::Credentials if status.is_client_error() => {
            CeaError::auth(Some(status.as_u16()), message)
        }
        Failure::Missing(entity_type, id) if status == StatusCode::NOT_FOUND => {
            CeaError::not_found(entity_type, id)
        }
        _ => CeaError::Transport {
            status: Some(status.as_u16()),
            message,
            detail: format!("HTTP {}", status),
        },
    }
}

/// Returns the response when it succeeded, or the classified failure.
async fn check(response: Response, operation: &str, failure: Failure<'_>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = classify(status, &body, failure);
    tracing::warn!("[Api] {} failed: {}", operation, err);
    Err(err)
}

async fn read_json<T: DeserializeOwned>(response: Response, operation: &str) -> Result<T> {
    let body = response.text().await.map_err(|e| request_error(operation, &e))?;
    serde_json::from_str(&body).map_err(|e| CeaError::Transport {
        status: None,
        message: None,
        detail: format!("{} returned an unreadable body: {}", operation, e),
    })
}

/// Path of the report endpoint; ids are plain tokens, never path fragments.
fn report_path(dataset_id: &str) -> Result<String> {
    let plain = !dataset_id.is_empty()
        && dataset_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !plain {
        return Err(CeaError::validation(format!(
            "invalid dataset id: {:?}",
            dataset_id
        )));
    }
    Ok(format!("generate-pdf/{}/", dataset_id))
}

/// File extension for a report, taken from its content type.
fn report_extension(content_type: Option<&str>) -> String {
    content_type
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .and_then(mime_guess::get_mime_extensions_str)
        .and_then(|extensions| extensions.first())
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| DEFAULT_REPORT_EXTENSION.to_string())
}

#[async_trait]
impl AnalysisApi for HttpAnalysisApi {
    async fn login(
        &self,
        session: Option<&Session>,
        credentials: &Credentials,
    ) -> Result<LoginGrant> {
        tracing::debug!("[Api] POST login/ for {}", credentials.email);
        let builder = authorize(self.login_request(credentials), session);
        let response = send(builder, "login").await?;
        let response = check(response, "login", Failure::Credentials).await?;
        read_json(response, "login").await
    }

    async fn register(
        &self,
        session: Option<&Session>,
        registration: &Registration,
    ) -> Result<()> {
        tracing::debug!("[Api] POST register/ for {}", registration.email);
        let builder = authorize(self.register_request(registration), session);
        let response = send(builder, "register").await?;
        check(response, "register", Failure::Credentials).await?;
        Ok(())
    }

    async fn upload(&self, session: Option<&Session>, file: &UploadFile) -> Result<UploadResult> {
        tracing::debug!("[Api] POST upload/ {} ({} bytes)", file.name, file.len());
        let response = send(self.upload_request(session, file)?, "upload").await?;
        let response = check(response, "upload", Failure::Plain).await?;
        read_json(response, "upload").await
    }

    async fn history(&self, session: Option<&Session>) -> Result<Vec<DatasetSummary>> {
        let builder = self.get_request(session, "history/", self.request_timeout);
        let response = send(builder, "history").await?;
        let response = check(response, "history", Failure::Plain).await?;
        let envelope: HistoryEnvelope = read_json(response, "history").await?;
        Ok(envelope.datasets)
    }

    async fn latest_summary(&self, session: Option<&Session>) -> Result<LatestSummary> {
        let builder = self.get_request(session, "summary/", self.request_timeout);
        let response = send(builder, "summary").await?;
        let response = check(response, "summary", Failure::Missing("summary", "latest")).await?;
        read_json(response, "summary").await
    }

    async fn report(&self, session: Option<&Session>, dataset_id: &str) -> Result<ReportPayload> {
        let path = report_path(dataset_id)?;
        let builder = self.get_request(session, &path, self.report_timeout);
        let response = send(builder, "report").await?;
        let response = check(response, "report", Failure::Missing("dataset", dataset_id)).await?;

        let extension = report_extension(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
        );
        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_error("report", &e))?;

        Ok(ReportPayload {
            bytes: bytes.to_vec(),
            extension,
        })
    }
}
