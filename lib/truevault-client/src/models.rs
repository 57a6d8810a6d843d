use std::ops::Deref;
use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::TrueVaultError;

const SUCCESS: &str = "success";
const DEFAULT_BLOB_CONTENT_TYPE: &str = "application/octet-stream";

/// Decoded JSON body of a TrueVault response
///
/// The service always answers with an object; `result` and `transaction_id`
/// are present on every call, the rest depends on the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiResponse(Map<String, Value>);

impl ApiResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, TrueVaultError> {
        serde_json::from_slice(body).map_err(|e| TrueVaultError::Decode(e.to_string()))
    }

    pub fn result(&self) -> Option<&str> {
        self.0.get("result").and_then(Value::as_str)
    }

    pub fn is_success(&self) -> bool {
        self.result() == Some(SUCCESS)
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.0.get("transaction_id").and_then(Value::as_str)
    }

    /// Deserialize a single field, `None` when it is absent
    pub fn decode_field<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, TrueVaultError> {
        self.0
            .get(key)
            .map(|value| {
                T::deserialize(value)
                    .map_err(|e| TrueVaultError::Decode(format!("field `{}`: {}", key, e)))
            })
            .transpose()
    }

    /// Vault descriptors of a `list_vaults` response
    pub fn vaults(&self) -> Result<Vec<Vault>, TrueVaultError> {
        Ok(self.decode_field("vaults")?.unwrap_or_default())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Deref for ApiResponse {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<ApiResponse> for Value {
    fn from(response: ApiResponse) -> Self {
        Value::Object(response.0)
    }
}

/// A vault as listed by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vault {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub account_id: Option<String>,
}

/// File content to upload as a blob
#[derive(Debug, Clone)]
pub struct BlobUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl BlobUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, TrueVaultError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                TrueVaultError::InvalidArgument(format!("Not a file path: {}", path.display()))
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, bytes))
    }

    /// Multipart form carrying the content in the `file` field
    pub(crate) fn into_form(self) -> Result<Form, TrueVaultError> {
        let content_type = self
            .content_type
            .unwrap_or_else(|| DEFAULT_BLOB_CONTENT_TYPE.to_string());
        let part = Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&content_type)
            .map_err(|_| {
                TrueVaultError::InvalidArgument(format!("Invalid content type: {}", content_type))
            })?;
        Ok(Form::new().part("file", part))
    }
}
