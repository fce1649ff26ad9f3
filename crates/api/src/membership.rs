//! HTTP client for the project service's membership endpoint.
//!
//! Implements [`MembershipOracle`] on top of [`reqwest`]. Every failure
//! (connect, timeout, non-2xx, malformed body) is logged and answered with
//! "not a member".

use std::time::Duration;

use async_trait::async_trait;
use kanban_core::membership::MembershipOracle;
use kanban_core::types::DbId;
use serde::Deserialize;

/// Body of `GET /api/v1/projects/{project_id}/members/{user_id}`.
#[derive(Debug, Deserialize)]
struct MembershipResponse {
    result: bool,
}

/// Errors from a single membership query.
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The project service returned a non-2xx status code.
    #[error("Project service error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

/// Membership oracle backed by the project service.
pub struct HttpMembershipOracle {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMembershipOracle {
    /// Create a client for the project service at `base_url`, e.g.
    /// `http://projects:8001`. Each query is bounded by `timeout`.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, MembershipError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Ask the project service whether `user_id` belongs to `project_id`.
    pub async fn check(&self, project_id: DbId, user_id: DbId) -> Result<bool, MembershipError> {
        let response = self
            .client
            .get(format!(
                "{}/api/v1/projects/{project_id}/members/{user_id}",
                self.base_url
            ))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MembershipError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<MembershipResponse>().await?.result)
    }
}

#[async_trait]
impl MembershipOracle for HttpMembershipOracle {
    async fn is_member(&self, project_id: DbId, user_id: DbId) -> bool {
        match self.check(project_id, user_id).await {
            Ok(member) => member,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    project_id = %project_id,
                    user_id = %user_id,
                    "Membership query failed, treating as non-member",
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn unreachable_service_means_not_a_member() {
        // Port 9 (discard) is closed on loopback in test environments.
        let oracle =
            HttpMembershipOracle::new("http://127.0.0.1:9".into(), Duration::from_millis(500))
                .unwrap();
        assert!(!oracle.is_member(Uuid::new_v4(), Uuid::new_v4()).await);
    }

    #[test]
    fn response_body_shape() {
        let body: MembershipResponse = serde_json::from_str(r#"{"result": true}"#).unwrap();
        assert!(body.result);
        assert!(serde_json::from_str::<MembershipResponse>(r#"{"member": true}"#).is_err());
    }
}
