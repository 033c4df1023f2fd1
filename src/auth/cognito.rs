use crate::auth::{SessionStore, TokenSet};
use crate::error::AppError;
use async_trait::async_trait;
use log::{error, info};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use url::Url;

/// Hosted-UI settings, all environment-driven.
#[derive(Clone, Debug)]
pub struct CognitoConfig {
    pub domain: String,
    pub client_id: String,
    pub redirect_sign_in: String,
    pub redirect_sign_out: String,
}

/// The configured domain may or may not carry a scheme.
pub fn normalize_domain(domain: &str) -> String {
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", domain.trim_end_matches('/'))
    }
}

/// Hosted-UI logout endpoint. Visiting it is the only way to invalidate
/// the provider-side session cookie; clearing local tokens is not enough.
pub fn hosted_logout_url(config: &CognitoConfig) -> Result<Url, AppError> {
    let mut url = Url::parse(&format!("{}/logout", normalize_domain(&config.domain)))
        .map_err(|e| AppError::Internal(Box::new(e)))?;
    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("logout_uri", &config.redirect_sign_out);
    Ok(url)
}

#[derive(Deserialize)]
struct TokenResponse {
    id_token: Option<String>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

impl From<TokenResponse> for TokenSet {
    fn from(resp: TokenResponse) -> Self {
        Self {
            id_token: resp.id_token,
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
            expires_in: resp.expires_in,
        }
    }
}

/// Session store backed by Cognito's OAuth2 token endpoint. The code
/// exchange runs as a background task so the retrier observes tokens
/// materializing between polls, the same way the hosted-UI library
/// completes sign-in out of band.
pub struct CognitoSessionStore {
    http: reqwest::Client,
    config: CognitoConfig,
    tokens: Arc<RwLock<Option<TokenSet>>>,
    notify: Arc<watch::Sender<bool>>,
}

impl CognitoSessionStore {
    pub fn new(http: reqwest::Client, config: CognitoConfig) -> Self {
        let (notify, _) = watch::channel(false);
        Self {
            http,
            config,
            tokens: Arc::new(RwLock::new(None)),
            notify: Arc::new(notify),
        }
    }

    async fn exchange_code(
        http: &reqwest::Client,
        config: &CognitoConfig,
        code: &str,
    ) -> Result<TokenSet, AppError> {
        let endpoint = format!("{}/oauth2/token", normalize_domain(&config.domain));
        let resp = http
            .post(&endpoint)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", config.client_id.as_str()),
                ("code", code),
                ("redirect_uri", config.redirect_sign_in.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(Some(status.as_u16()), body));
        }

        let parsed: TokenResponse = resp.json().await?;
        Ok(parsed.into())
    }
}

#[async_trait]
impl SessionStore for CognitoSessionStore {
    async fn current_session(&self) -> Option<TokenSet> {
        self.tokens.read().await.clone()
    }

    fn begin_exchange(&self, code: &str) {
        let http = self.http.clone();
        let config = self.config.clone();
        let tokens = self.tokens.clone();
        let notify = self.notify.clone();
        let code = code.to_string();

        tokio::spawn(async move {
            match Self::exchange_code(&http, &config, &code).await {
                Ok(token_set) => {
                    info!("Cognito code exchange completed");
                    *tokens.write().await = Some(token_set);
                    notify.send_replace(true);
                }
                Err(e) => {
                    // Logged, never raised: the retrier times out and the
                    // resolver routes back to login.
                    error!("Cognito code exchange failed: {}", e);
                }
            }
        });
    }

    fn watch(&self) -> Option<watch::Receiver<bool>> {
        Some(self.notify.subscribe())
    }

    async fn clear(&self) {
        *self.tokens.write().await = None;
        self.notify.send_replace(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CognitoConfig {
        CognitoConfig {
            domain: "eu-north-1example.auth.eu-north-1.amazoncognito.com".to_string(),
            client_id: "abc123".to_string(),
            redirect_sign_in: "https://app.example.com/".to_string(),
            redirect_sign_out: "https://app.example.com/login".to_string(),
        }
    }

    #[test]
    fn normalizes_scheme_less_domains() {
        assert_eq!(
            normalize_domain("idp.example.com"),
            "https://idp.example.com"
        );
        assert_eq!(
            normalize_domain("https://idp.example.com/"),
            "https://idp.example.com"
        );
    }

    #[test]
    fn logout_url_encodes_redirect() {
        let url = hosted_logout_url(&config()).unwrap();
        assert_eq!(url.path(), "/logout");
        assert_eq!(
            url.as_str(),
            "https://eu-north-1example.auth.eu-north-1.amazoncognito.com/logout?client_id=abc123&logout_uri=https%3A%2F%2Fapp.example.com%2Flogin"
        );
    }

    #[tokio::test]
    async fn clear_empties_the_token_set() {
        let store = CognitoSessionStore::new(reqwest::Client::new(), config());
        *store.tokens.write().await = Some(TokenSet {
            access_token: Some("opaque".to_string()),
            ..TokenSet::default()
        });

        store.clear().await;
        assert!(store.current_session().await.is_none());
    }
}
