use std::path::Path;
use std::time::Duration;

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;

use crate::auth::ApiKeyAuth;
use crate::error::TrueVaultError;
use crate::models::{ApiResponse, BlobUpload};

pub const DEFAULT_BASE_URL: &str = "https://api.truevault.com";
pub const DEFAULT_API_VERSION: &str = "v1";

pub struct VaultClientBuilder {
    api_key: Option<String>,
    account_id: Option<String>,
    api_version: Option<String>,
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    http_client: Option<reqwest::Client>,
}

impl Default for VaultClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultClientBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            account_id: None,
            api_version: None,
            base_url: None,
            user_agent: None,
            timeout: None,
            http_client: None,
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a preconfigured HTTP client instead of a default one
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> Result<VaultClient, TrueVaultError> {
        let api_key = self
            .api_key
            .ok_or_else(|| TrueVaultError::InvalidArgument("API key is required".to_string()))?;
        let auth = ApiKeyAuth::new(api_key)?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let base = Url::parse(&base_url).map_err(|e| {
            TrueVaultError::InvalidArgument(format!("Invalid base URL {}: {}", base_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(TrueVaultError::InvalidArgument(format!(
                "Invalid base URL {}: not a hierarchical URL",
                base_url
            )));
        }

        let api_version = match self.api_version {
            Some(v) if !v.trim().is_empty() => v.trim_matches('/').to_string(),
            _ => DEFAULT_API_VERSION.to_string(),
        };

        Ok(VaultClient {
            base_url,
            base,
            api_version,
            account_id: self.account_id,
            auth,
            user_agent: self.user_agent,
            timeout: self.timeout,
            http: self.http_client.unwrap_or_default(),
        })
    }
}

/// Client for the TrueVault REST API
///
/// Holds only the immutable credential and a `reqwest::Client`, so it can be
/// cloned and shared between tasks freely.
#[derive(Debug, Clone)]
pub struct VaultClient {
    base_url: String,
    base: Url,
    api_version: String,
    account_id: Option<String>,
    auth: ApiKeyAuth,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    http: reqwest::Client,
}

impl VaultClient {
    pub fn new(
        api_key: impl Into<String>,
        account_id: Option<String>,
        api_version: Option<String>,
    ) -> Result<Self, TrueVaultError> {
        let mut builder = VaultClientBuilder::new().api_key(api_key);
        if let Some(account_id) = account_id {
            builder = builder.account_id(account_id);
        }
        if let Some(api_version) = api_version {
            builder = builder.api_version(api_version);
        }
        builder.build()
    }

    /// Build from `TV_API_KEY`, `TV_ACCOUNT_ID`, `TV_API_VERSION` and `TV_BASE_URL`
    pub fn from_env() -> Result<Self, TrueVaultError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TrueVaultError> {
        let api_key = lookup("TV_API_KEY")
            .ok_or_else(|| TrueVaultError::InvalidArgument("TV_API_KEY not set".to_string()))?;

        let mut builder = VaultClientBuilder::new().api_key(api_key);
        if let Some(account_id) = lookup("TV_ACCOUNT_ID") {
            builder = builder.account_id(account_id);
        }
        if let Some(api_version) = lookup("TV_API_VERSION") {
            builder = builder.api_version(api_version);
        }
        if let Some(base_url) = lookup("TV_BASE_URL") {
            builder = builder.base_url(base_url);
        }
        builder.build()
    }

    pub fn builder() -> VaultClientBuilder {
        VaultClientBuilder::new()
    }

    pub fn api_key(&self) -> &str {
        self.auth.api_key()
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health_check(&self) -> Result<ApiResponse, TrueVaultError> {
        // The service root answers on the trailing slash
        self.execute(self.request(Method::GET, &[""])?).await
    }

    pub async fn list_vaults(&self) -> Result<ApiResponse, TrueVaultError> {
        self.execute(self.request(Method::GET, &["vaults"])?).await
    }

    pub async fn create_document<T>(
        &self,
        vault_id: &str,
        fields: &T,
    ) -> Result<ApiResponse, TrueVaultError>
    where
        T: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, &["vaults", path_id(vault_id)?, "documents"])?;
        self.execute(request.json(fields)).await
    }

    pub async fn get_document(
        &self,
        vault_id: &str,
        document_id: &str,
    ) -> Result<ApiResponse, TrueVaultError> {
        let segments = ["vaults", path_id(vault_id)?, "documents", path_id(document_id)?];
        self.execute(self.request(Method::GET, &segments)?).await
    }

    pub async fn update_document<T>(
        &self,
        vault_id: &str,
        document_id: &str,
        fields: &T,
    ) -> Result<ApiResponse, TrueVaultError>
    where
        T: Serialize + ?Sized,
    {
        let segments = ["vaults", path_id(vault_id)?, "documents", path_id(document_id)?];
        let request = self.request(Method::PUT, &segments)?;
        self.execute(request.json(fields)).await
    }

    pub async fn delete_document(
        &self,
        vault_id: &str,
        document_id: &str,
    ) -> Result<ApiResponse, TrueVaultError> {
        let segments = ["vaults", path_id(vault_id)?, "documents", path_id(document_id)?];
        self.execute(self.request(Method::DELETE, &segments)?).await
    }

    /// Upload the file at `file` as a new blob
    pub async fn create_blob(
        &self,
        vault_id: &str,
        file: impl AsRef<Path>,
    ) -> Result<ApiResponse, TrueVaultError> {
        let upload = BlobUpload::from_path(file).await?;
        self.create_blob_upload(vault_id, upload).await
    }

    pub async fn create_blob_upload(
        &self,
        vault_id: &str,
        upload: BlobUpload,
    ) -> Result<ApiResponse, TrueVaultError> {
        let request = self.request(Method::POST, &["vaults", path_id(vault_id)?, "blobs"])?;
        let form = upload.into_form()?;
        self.execute(request.multipart(form)).await
    }

    /// Raw blob content; the only endpoint that does not answer with JSON
    pub async fn get_blob(&self, vault_id: &str, blob_id: &str) -> Result<Vec<u8>, TrueVaultError> {
        let segments = ["vaults", path_id(vault_id)?, "blobs", path_id(blob_id)?];
        let response = self.send(self.request(Method::GET, &segments)?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn replace_blob(
        &self,
        vault_id: &str,
        blob_id: &str,
        upload: BlobUpload,
    ) -> Result<ApiResponse, TrueVaultError> {
        let segments = ["vaults", path_id(vault_id)?, "blobs", path_id(blob_id)?];
        let request = self.request(Method::PUT, &segments)?;
        let form = upload.into_form()?;
        self.execute(request.multipart(form)).await
    }

    pub async fn delete_blob(
        &self,
        vault_id: &str,
        blob_id: &str,
    ) -> Result<ApiResponse, TrueVaultError> {
        let segments = ["vaults", path_id(vault_id)?, "blobs", path_id(blob_id)?];
        self.execute(self.request(Method::DELETE, &segments)?).await
    }

    /// `{base}/{version}/{segments..}`, each segment percent-encoded
    fn url(&self, segments: &[&str]) -> Result<Url, TrueVaultError> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                TrueVaultError::InvalidArgument(format!("Invalid base URL {}", self.base_url))
            })?;
            path.pop_if_empty();
            path.extend(self.api_version.split('/'));
            path.extend(segments);
        }
        Ok(url)
    }

    pub(crate) fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, TrueVaultError> {
        let url = self.url(segments)?;
        tracing::debug!(%method, %url, "TrueVault request");

        let mut request = self.http.request(method, url).header(ACCEPT, "application/json");
        if let Some(ref user_agent) = self.user_agent {
            request = request.header(USER_AGENT, user_agent);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        Ok(self.auth.apply(request))
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, TrueVaultError> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::debug!(status, "Failed to read error body: {}", e);
                String::new()
            });
            tracing::warn!(status, "TrueVault request failed");
            let response_data = serde_json::from_str(&body).ok();
            return Err(TrueVaultError::Status {
                status,
                body,
                response_data,
            });
        }

        Ok(response)
    }

    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<ApiResponse, TrueVaultError> {
        let response = self.send(request).await?;
        let body = response.bytes().await?;
        ApiResponse::from_slice(&body)
    }
}

/// Validate a caller-supplied id used as one path segment
pub(crate) fn path_id(value: &str) -> Result<&str, TrueVaultError> {
    // `.` and `..` are dropped by URL normalization and would change the endpoint
    if value.trim().is_empty() || value == "." || value == ".." {
        return Err(TrueVaultError::InvalidArgument(format!(
            "Invalid resource id: {:?}",
            value
        )));
    }
    Ok(value)
}
