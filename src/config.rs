use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Base URL used when composing ticket verification links
    /// (e.g., https://api.eventhive.example)
    pub base_url: String,
    /// Shared secret for payment webhook signature verification
    pub webhook_secret: String,
    /// Resend API key for outbound email (emails are skipped when absent)
    pub resend_api_key: Option<String>,
    pub email_from: String,
    /// Object storage gateway for generated ticket documents
    pub storage_endpoint: String,
    pub storage_bucket: String,
    pub storage_token: Option<String>,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("EVENTHIVE_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "eventhive.db".to_string()),
            base_url,
            webhook_secret: env::var("WEBHOOK_SECRET")
                .unwrap_or_else(|_| "dev-webhook-secret".to_string()),
            resend_api_key: env::var("RESEND_API_KEY").ok(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "tickets@eventhive.local".to_string()),
            storage_endpoint: env::var("STORAGE_ENDPOINT")
                .unwrap_or_else(|_| "http://127.0.0.1:9000".to_string()),
            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "tickets".to_string()),
            storage_token: env::var("STORAGE_TOKEN").ok(),
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
