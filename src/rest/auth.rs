use reqwest::{Method, StatusCode};
use tracing::instrument;

use crate::error::{LudothekError, Result};
use crate::model::User;
use crate::rest::{self, Service};

/// Resolve the caller's access token into a user.
#[instrument(skip(service))]
pub(crate) async fn current_user(service: &Service) -> Result<User> {
    if service.access_token.is_none() {
        return Err(LudothekError::NotSignedIn);
    }
    let url = format!("{}/auth/v1/user", service.config.url);
    let request = service.request(Method::GET, &url);
    match rest::send(&url, request).await {
        Ok(response) => rest::decode(&url, response).await,
        Err(LudothekError::UnexpectedStatus { status, .. })
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
        {
            Err(LudothekError::NotSignedIn)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_anonymous_caller_is_not_signed_in() {
        let service = Service {
            http: reqwest::Client::new(),
            config: Arc::new(Config::new("http://127.0.0.1:9", "anon")),
            access_token: None,
        };
        let result = current_user(&service).await;
        assert!(matches!(result, Err(LudothekError::NotSignedIn)));
    }
}
