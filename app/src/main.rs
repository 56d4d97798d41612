use axum::{
    Json, Router,
    middleware,
    routing::{get, post},
};
use clap::Parser;
use common::{AppState, Config, auth::auth_middleware};
use database::Database;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod handlers;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // 1. Initialize Logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Load Config from CLI args / environment
    let config = Config::parse();

    // 3. Initialize Database
    let db = Database::new(&config.database_url).await?;
    db.run_migrations().await?;

    // 4. Chat assistant is optional; without a key the analysis endpoint
    //    answers 503
    let assistant = match &config.openrouter_api_key {
        Some(key) => {
            let mut chat_config = assistant::ChatConfig::new(key, &config.chat_model)
                .with_timeout(Duration::from_secs(config.chat_timeout_secs));
            if let Some(base_url) = &config.openrouter_base_url {
                chat_config = chat_config.with_base_url(base_url);
            }
            Some(assistant::ChatClient::new(chat_config)?)
        }
        None => {
            tracing::warn!("OPENROUTER_API_KEY is not set; monthly analysis is disabled");
            None
        }
    };

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        assistant,
    });

    // 5. Session Store
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false); // Set to true in production with HTTPS

    // 6. Routing
    let api = Router::<Arc<AppState>>::new()
        .nest("/profile", profiles::handler::profiles_router(state.clone()))
        .nest("/categories", categories::handler::categories_router(state.clone()))
        .nest("/transactions", transactions::handler::transactions_router(state.clone()))
        .nest("/summary", summary::handler::summary_router(state.clone()))
        .layer(middleware::from_fn(auth_middleware));

    let app = Router::<Arc<AppState>>::new()
        .route("/healthz", get(healthz))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .nest("/api", api)
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http());

    // 7. Start Server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    if config.app_password.is_none() {
        tracing::warn!("APP_PASSWORD is not set! Any password will be accepted at login.");
    }
    axum::serve(listener, app).await?;

    Ok(())
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
