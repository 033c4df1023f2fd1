pub mod api;

use crate::advisor::Advisor;
use crate::analysis::Analyzer;
use crate::auth::cognito::{CognitoConfig, CognitoSessionStore};
use crate::auth::{SessionResolver, SessionStore};
use crate::cli::Args;
use crate::upstream::classifier::GradioClassifier;
use crate::upstream::gemini::GeminiClient;
use crate::upstream::weather::OpenWeatherClient;
use crate::upstream::WeatherClient;
use api::{AppState, AuthContext};
use log::warn;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    addr: String,
    state: AppState,
    args: Args,
}

impl Server {
    /// Wires the upstream clients from the environment-driven config.
    /// Chat and classification are mandatory; weather and authentication
    /// degrade to unconfigured endpoints when their settings are absent.
    pub fn new(args: Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let http = reqwest::Client::new();

        let gemini_api_key = args
            .gemini_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or("Missing GEMINI_API_KEY")?;
        let chat_base_url = args
            .chat_base_url
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or("Missing CHAT_BASE_URL")?;
        let classifier_base_url = args
            .classifier_base_url
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or("Missing CLASSIFIER_BASE_URL")?;

        let advisor = Arc::new(Advisor::new(Arc::new(GeminiClient::new(
            http.clone(),
            gemini_api_key,
            args.gemini_model.clone(),
            chat_base_url,
        ))));

        let analyzer = Arc::new(Analyzer::new(Arc::new(GradioClassifier::new(
            classifier_base_url,
            Duration::from_secs(args.classifier_timeout_secs),
        )?)));

        let weather: Option<Arc<dyn WeatherClient>> =
            match (args.weather_base_url.clone(), args.weather_api_key.clone()) {
                (Some(base_url), Some(api_key)) => Some(Arc::new(OpenWeatherClient::new(
                    http.clone(),
                    base_url,
                    api_key,
                ))),
                _ => {
                    warn!("weather provider not configured, /api/weather disabled");
                    None
                }
            };

        let auth = match (
            args.cognito_domain.clone(),
            args.cognito_client_id.clone(),
            args.redirect_sign_in.clone(),
            args.redirect_sign_out.clone(),
        ) {
            (Some(domain), Some(client_id), Some(redirect_sign_in), Some(redirect_sign_out)) => {
                let config = CognitoConfig {
                    domain,
                    client_id,
                    redirect_sign_in,
                    redirect_sign_out,
                };
                let store: Arc<dyn SessionStore> =
                    Arc::new(CognitoSessionStore::new(http, config.clone()));
                Some(AuthContext {
                    resolver: Arc::new(SessionResolver::new(store.clone())),
                    store,
                    config,
                })
            }
            _ => {
                warn!("identity provider not configured, /auth endpoints disabled");
                None
            }
        };

        Ok(Self {
            addr: args.server_addr.clone(),
            state: AppState {
                advisor,
                analyzer,
                weather,
                auth,
            },
            args,
        })
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(&self.addr, self.state.clone(), &self.args).await
    }
}
