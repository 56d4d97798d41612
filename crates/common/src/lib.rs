use clap::Parser;
use database::Database;

pub mod auth;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    /// `None` when no API key is configured; the analysis endpoint
    /// answers 503 in that case.
    pub assistant: Option<assistant::ChatClient>,
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:ledger.db")]
    pub database_url: String,

    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    #[arg(long, env = "APP_PASSWORD")]
    pub app_password: Option<String>,

    #[arg(long, env = "OPENROUTER_API_KEY")]
    pub openrouter_api_key: Option<String>,

    #[arg(long, env = "OPENROUTER_BASE_URL")]
    pub openrouter_base_url: Option<String>,

    #[arg(long, env = "CHAT_MODEL", default_value = "openai/gpt-4o-mini")]
    pub chat_model: String,

    #[arg(long, env = "CHAT_TIMEOUT_SECS", default_value = "30")]
    pub chat_timeout_secs: u64,
}
