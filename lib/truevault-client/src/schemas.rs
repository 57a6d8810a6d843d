use reqwest::Method;
use serde::Serialize;

use crate::client::{VaultClient, path_id};
use crate::error::TrueVaultError;
use crate::models::ApiResponse;

/// Vault schema endpoints
impl VaultClient {
    pub async fn list_schemas(&self, vault_id: &str) -> Result<ApiResponse, TrueVaultError> {
        let segments = ["vaults", path_id(vault_id)?, "schemas"];
        self.execute(self.request(Method::GET, &segments)?).await
    }

    pub async fn create_schema<T>(
        &self,
        vault_id: &str,
        schema: &T,
    ) -> Result<ApiResponse, TrueVaultError>
    where
        T: Serialize + ?Sized,
    {
        let segments = ["vaults", path_id(vault_id)?, "schemas"];
        let request = self.request(Method::POST, &segments)?;
        self.execute(request.json(schema)).await
    }

    pub async fn get_schema(
        &self,
        vault_id: &str,
        schema_id: &str,
    ) -> Result<ApiResponse, TrueVaultError> {
        let segments = ["vaults", path_id(vault_id)?, "schemas", path_id(schema_id)?];
        self.execute(self.request(Method::GET, &segments)?).await
    }

    pub async fn update_schema<T>(
        &self,
        vault_id: &str,
        schema_id: &str,
        schema: &T,
    ) -> Result<ApiResponse, TrueVaultError>
    where
        T: Serialize + ?Sized,
    {
        let segments = ["vaults", path_id(vault_id)?, "schemas", path_id(schema_id)?];
        let request = self.request(Method::PUT, &segments)?;
        self.execute(request.json(schema)).await
    }

    pub async fn delete_schema(
        &self,
        vault_id: &str,
        schema_id: &str,
    ) -> Result<ApiResponse, TrueVaultError> {
        let segments = ["vaults", path_id(vault_id)?, "schemas", path_id(schema_id)?];
        self.execute(self.request(Method::DELETE, &segments)?).await
    }
}
