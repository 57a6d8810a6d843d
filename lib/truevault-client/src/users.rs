use reqwest::Method;
use serde::Serialize;

use crate::client::{VaultClient, path_id};
use crate::error::TrueVaultError;
use crate::models::ApiResponse;

// Users live at the account level, outside any vault.
impl VaultClient {
    pub async fn list_users(&self) -> Result<ApiResponse, TrueVaultError> {
        self.execute(self.request(Method::GET, &["users"])?).await
    }

    pub async fn create_user<T>(&self, fields: &T) -> Result<ApiResponse, TrueVaultError>
    where
        T: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, &["users"])?;
        self.execute(request.json(fields)).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<ApiResponse, TrueVaultError> {
        let segments = ["users", path_id(user_id)?];
        self.execute(self.request(Method::GET, &segments)?).await
    }

    pub async fn update_user<T>(
        &self,
        user_id: &str,
        fields: &T,
    ) -> Result<ApiResponse, TrueVaultError>
    where
        T: Serialize + ?Sized,
    {
        let segments = ["users", path_id(user_id)?];
        let request = self.request(Method::PUT, &segments)?;
        self.execute(request.json(fields)).await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<ApiResponse, TrueVaultError> {
        let segments = ["users", path_id(user_id)?];
        self.execute(self.request(Method::DELETE, &segments)?).await
    }
}
