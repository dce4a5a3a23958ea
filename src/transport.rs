use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde_json::Value;

use crate::error::UploadError;
use crate::preview::SelectedFile;

pub const PROCESS_PATH: &str = "/process";
pub const IMAGE_FIELD: &str = "image";

/// Body of one submission: the single `image` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestPayload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl RequestPayload {
    pub async fn from_file(file: &SelectedFile) -> Result<Self, UploadError> {
        Ok(Self {
            file_name: file.name().to_string(),
            content_type: file.content_type().to_string(),
            bytes: file.read().await?,
        })
    }
}

/// The fields of a `/process` body the page renders, coerced to text.
///
/// Bodies are read loosely: any JSON value is accepted, and a field that is
/// absent (or a body that is not an object) simply yields `None`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProcessResponse {
    pub description_fr: Option<String>,
    pub error: Option<String>,
}

impl ProcessResponse {
    pub fn from_value(body: &Value) -> Self {
        Self {
            description_fr: body.get("description_fr").and_then(text_of),
            error: body.get("error").filter(|v| is_truthy(v)).and_then(text_of),
        }
    }
}

/// Strings verbatim, `null` as nothing, anything else as its JSON text.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Status and undecoded body of a `/process` response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decide the outcome from the status code, then read the body.
    ///
    /// On success the body must be valid JSON, whatever its shape; a missing
    /// or null `description_fr` renders as empty text. On failure the body is
    /// read leniently so a status-coded message is still produced for empty
    /// or non-JSON bodies, and for falsy `error` values.
    pub fn into_description(self) -> Result<String, UploadError> {
        if self.is_success() {
            let body: Value = serde_json::from_slice(&self.body)?;
            return Ok(ProcessResponse::from_value(&body)
                .description_fr
                .unwrap_or_default());
        }

        let message = serde_json::from_slice::<Value>(&self.body)
            .ok()
            .and_then(|body| ProcessResponse::from_value(&body).error);

        match message {
            Some(message) => Err(UploadError::Server {
                status: self.status,
                message,
            }),
            None => Err(UploadError::Status(self.status)),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, payload: RequestPayload) -> Result<RawResponse, UploadError>;
}

/// Posts payloads to `<server>/process` as `multipart/form-data`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(server: &str) -> Result<Self, UploadError> {
        let endpoint = Url::parse(server)
            .and_then(|base| base.join(PROCESS_PATH))
            .map_err(|e| UploadError::InvalidServerUrl(format!("{server}: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(&self, payload: RequestPayload) -> Result<RawResponse, UploadError> {
        let size = payload.bytes.len();
        let part = Part::bytes(payload.bytes)
            .file_name(payload.file_name)
            .mime_str(&payload.content_type)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        tracing::debug!(endpoint = %self.endpoint, size, "posting image");

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        tracing::debug!(status, body_len = body.len(), "process response");

        Ok(RawResponse::new(status, body.to_vec()))
    }
}
