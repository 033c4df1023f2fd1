pub mod cognito;

use async_trait::async_trait;
use log::{error, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use url::Url;

/// Query parameters the identity provider appends to the redirect URL.
/// Stripped once handled so a reload cannot re-trigger the exchange.
pub const OAUTH_PARAMS: [&str; 6] = [
    "code",
    "state",
    "error",
    "error_description",
    "iss",
    "client_id",
];

pub const EXCHANGE_ATTEMPTS: usize = 6;

/// Delay before 0-indexed attempt `i`: 250, 500, 750, 1000, 1250, 1500 ms.
pub fn backoff_delay(attempt: usize) -> Duration {
    Duration::from_millis(250 + attempt as u64 * 250)
}

/// Token set as reported by the identity provider. A session counts as
/// authenticated when an id or access credential is present.
#[derive(Clone, Debug, Default)]
pub struct TokenSet {
    pub id_token: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

impl TokenSet {
    pub fn has_credential(&self) -> bool {
        self.id_token.is_some() || self.access_token.is_some()
    }
}

/// Derived on every resolution, never persisted. The identity is an opaque
/// credential, not a decoded user profile.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub authenticated: bool,
    pub identity: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: &TokenSet) -> Self {
        Self {
            authenticated: tokens.has_credential(),
            identity: tokens.id_token.clone().or_else(|| tokens.access_token.clone()),
        }
    }
}

/// Where the caller should land after resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Dashboard,
    Login,
}

/// Session state owned by the identity-provider integration. `watch`
/// optionally exposes an auth-change subscription; stores without one fall
/// back to pure polling in the retrier.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn current_session(&self) -> Option<TokenSet>;

    /// Kicks off the code-for-token exchange in the background. Completion
    /// is observed through `current_session`/`watch`, never awaited here.
    fn begin_exchange(&self, code: &str);

    fn watch(&self) -> Option<watch::Receiver<bool>> {
        None
    }

    async fn clear(&self);
}

/// Bounded poll for exchange completion. The schedule is fixed; an
/// auth-change notification can only make an attempt fire early, it never
/// extends the budget.
#[derive(Clone, Copy, Debug)]
pub struct ExchangeRetrier {
    attempts: usize,
}

impl Default for ExchangeRetrier {
    fn default() -> Self {
        Self {
            attempts: EXCHANGE_ATTEMPTS,
        }
    }
}

impl ExchangeRetrier {
    pub fn new(attempts: usize) -> Self {
        Self { attempts }
    }

    /// Polls the store until a credential-bearing token set appears or the
    /// attempt budget runs out. The provider may complete the exchange
    /// strictly between polls; only the poll result counts.
    pub async fn wait_for_session(&self, store: &dyn SessionStore) -> Option<TokenSet> {
        let mut subscription = store.watch();

        let mut attempt = 0;
        while attempt < self.attempts {
            let woke_early = match subscription.as_mut() {
                Some(rx) => {
                    tokio::select! {
                        _ = sleep(backoff_delay(attempt)) => false,
                        changed = rx.changed() => changed.is_ok(),
                    }
                }
                None => {
                    sleep(backoff_delay(attempt)).await;
                    false
                }
            };

            if let Some(tokens) = store.current_session().await {
                if tokens.has_credential() {
                    return Some(tokens);
                }
            }

            if woke_early {
                // One notification per exchange; a wake without tokens
                // drops the subscription and keeps the full poll budget.
                subscription = None;
            } else {
                attempt += 1;
            }
        }

        None
    }
}

/// Everything the caller needs after handling a redirect: where to go,
/// the derived session, and the URL with OAuth parameters removed.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub route: Route,
    pub session: Session,
    pub cleaned_url: Url,
}

/// Decides between the three redirect outcomes: provider error, pending
/// code exchange, or a plain session check. No retry at this layer.
pub struct SessionResolver {
    store: Arc<dyn SessionStore>,
    retrier: ExchangeRetrier,
}

impl SessionResolver {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            retrier: ExchangeRetrier::default(),
        }
    }

    pub fn with_retrier(store: Arc<dyn SessionStore>, retrier: ExchangeRetrier) -> Self {
        Self { store, retrier }
    }

    pub async fn resolve(&self, url: &Url) -> Resolution {
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let cleaned_url = clear_oauth_params(url);

        if let Some(err) = params.get("error") {
            warn!(
                "identity provider returned an error: {} ({})",
                err,
                params
                    .get("error_description")
                    .map(String::as_str)
                    .unwrap_or("no description")
            );
            return Resolution {
                route: Route::Login,
                session: Session::anonymous(),
                cleaned_url,
            };
        }

        if let Some(code) = params.get("code") {
            self.store.begin_exchange(code);
            return match self.retrier.wait_for_session(self.store.as_ref()).await {
                Some(tokens) => {
                    info!("code exchange completed, session authenticated");
                    Resolution {
                        route: Route::Dashboard,
                        session: Session::from_tokens(&tokens),
                        cleaned_url,
                    }
                }
                None => {
                    error!("OAuth code exchange did not produce tokens");
                    Resolution {
                        route: Route::Login,
                        session: Session::anonymous(),
                        cleaned_url,
                    }
                }
            };
        }

        match self.store.current_session().await {
            Some(tokens) if tokens.has_credential() => Resolution {
                route: Route::Dashboard,
                session: Session::from_tokens(&tokens),
                cleaned_url,
            },
            _ => Resolution {
                route: Route::Login,
                session: Session::anonymous(),
                cleaned_url,
            },
        }
    }
}

/// Returns the URL with every OAuth parameter removed and all other query
/// parameters intact.
pub fn clear_oauth_params(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !OAUTH_PARAMS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut cleaned = url.clone();
    cleaned.set_query(None);
    if !kept.is_empty() {
        cleaned.query_pairs_mut().extend_pairs(kept);
    }
    cleaned
}
