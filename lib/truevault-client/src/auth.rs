use std::fmt;

use reqwest::RequestBuilder;

use crate::TrueVaultError;

/// API key authentication
///
/// TrueVault expects HTTP Basic auth with the API key as the username and an
/// empty password.
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: String,
}

impl ApiKeyAuth {
    pub fn new(api_key: String) -> Result<Self, TrueVaultError> {
        if api_key.trim().is_empty() {
            return Err(TrueVaultError::InvalidArgument(
                "API key is required".to_string(),
            ));
        }
        Ok(Self { api_key })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.api_key, Some(""))
    }
}

impl fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
