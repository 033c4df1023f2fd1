use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host address and port for the gateway to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:3001")]
    pub server_addr: String,

    // --- Chat relay (Gemini) ---
    /// API key for the generation provider. Required.
    #[arg(long, env = "GEMINI_API_KEY")]
    pub gemini_api_key: Option<String>,

    /// Model name for chat generation.
    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.5-pro")]
    pub gemini_model: String,

    /// Base URL of the generation API (e.g. https://generativelanguage.googleapis.com/v1beta).
    #[arg(long, env = "CHAT_BASE_URL")]
    pub chat_base_url: Option<String>,

    // --- Classification proxy ---
    /// Base URL of the hosted classifier space.
    #[arg(long, env = "CLASSIFIER_BASE_URL")]
    pub classifier_base_url: Option<String>,

    /// Request timeout for classifier calls, in seconds.
    #[arg(long, env = "CLASSIFIER_TIMEOUT_SECS", default_value = "30")]
    pub classifier_timeout_secs: u64,

    // --- Weather proxy ---
    /// Base URL of the weather provider (e.g. https://api.openweathermap.org/data/2.5).
    #[arg(long, env = "WEATHER_BASE_URL")]
    pub weather_base_url: Option<String>,

    /// API key for the weather provider.
    #[arg(long, env = "WEATHER_API_KEY")]
    pub weather_api_key: Option<String>,

    // --- Identity provider (Cognito hosted UI) ---
    /// Cognito hosted-UI domain (with or without scheme).
    #[arg(long, env = "COGNITO_DOMAIN")]
    pub cognito_domain: Option<String>,

    /// Cognito app client id.
    #[arg(long, env = "COGNITO_CLIENT_ID")]
    pub cognito_client_id: Option<String>,

    /// Redirect URI registered for sign-in.
    #[arg(long, env = "REDIRECT_SIGN_IN")]
    pub redirect_sign_in: Option<String>,

    /// Redirect URI registered for sign-out.
    #[arg(long, env = "REDIRECT_SIGN_OUT")]
    pub redirect_sign_out: Option<String>,

    // --- TLS ---
    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,

    /// Enable debug logging/output.
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
