use serde_json::json;
use tracing::info;

use tillpoint_core::validation::validate_credentials;

use crate::error::{ClientError, ClientResult};
use crate::http::PosClient;
use crate::wire::TokenPair;

const LOGIN_PATH: &str = "api/token/";

impl PosClient {
    /// Exchanges credentials for a token pair and stores it with the branch.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<Option<String>> {
        validate_credentials(username, password)?;
        let body = self
            .post_anonymous(
                LOGIN_PATH,
                &json!({ "username": username.trim(), "password": password }),
            )
            .await?;
        let pair: TokenPair = serde_json::from_value(body)
            .map_err(|e| ClientError::decode("login", e.to_string()))?;

        let session = self.session();
        session.set_tokens(pair.access, pair.refresh).await?;
        session.set_branch(pair.branch).await?;
        let branch = session.branch().await;
        info!(user = username.trim(), branch = ?branch, "Logged in");
        Ok(branch)
    }

    /// Forgets the session locally. The backend keeps no server-side state to end.
    pub async fn logout(&self) -> ClientResult<()> {
        self.session().clear().await?;
        info!("Logged out");
        Ok(())
    }
}
