mod api;
mod assembly;
mod chatbots;
mod config;
mod llm;
mod store;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::Request;
use clap::Parser;
use dotenvy::dotenv;
use sentry::integrations::tower::{NewSentryLayer, SentryHttpLayer};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::chatbots::store_repository::StoreChatbotRepository;
use crate::llm::gemini::GeminiClient;
use crate::store::StoreClient;
use crate::store::memory::MemoryStore;
use crate::store::postgrest::PostgrestStore;

#[derive(Parser)]
#[command(name = "hqbot", about = "Chatbot prompt-assembly backend")]
enum Cli {
    /// Start the HTTP server (default when no subcommand is given)
    #[command(alias = "run")]
    Serve {
        /// Serve from an in-memory store seeded from this YAML fixture file
        /// instead of the hosted store
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let cli = if args.len() <= 1 {
        // No subcommand given, default to serve
        Cli::Serve { fixtures: None }
    } else {
        Cli::parse()
    };

    match cli {
        Cli::Serve { fixtures } => run_server(fixtures).await,
    }
}

async fn run_server(fixtures: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let config = config::Config::from_env();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hqbot=info,tower_http=warn,hyper=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(false),
        )
        .with(sentry::integrations::tracing::layer().event_filter(
            |metadata| match *metadata.level() {
                tracing::Level::ERROR => sentry::integrations::tracing::EventFilter::Event,
                tracing::Level::WARN | tracing::Level::INFO => {
                    sentry::integrations::tracing::EventFilter::Breadcrumb
                }
                _ => sentry::integrations::tracing::EventFilter::Ignore,
            },
        ))
        .init();

    let _guard = sentry::init((
        config.sentry_dsn.clone().unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.environment.clone().into()),
            send_default_pii: true,
            traces_sample_rate: 0.2,
            enable_logs: true,
            ..Default::default()
        },
    ));

    let http_client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;

    let store: Arc<dyn StoreClient> = match (&fixtures, &config.store_url) {
        (Some(path), _) => {
            tracing::info!(path = %path.display(), "serving from fixture store");
            Arc::new(MemoryStore::from_yaml_file(path).context("failed to load fixtures")?)
        }
        (None, Some(store_url)) => {
            let service_key = config
                .store_service_key
                .clone()
                .context("STORE_SERVICE_KEY is required with STORE_URL")?;
            Arc::new(PostgrestStore::new(
                http_client.clone(),
                store_url.clone(),
                service_key,
            ))
        }
        (None, None) => {
            tracing::warn!("no STORE_URL configured, serving from an empty in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let chatbot_repo = Arc::new(StoreChatbotRepository::new(store.clone()));
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set, chat turns will fail until configured");
    }
    let llm = Arc::new(GeminiClient::new(
        http_client.clone(),
        config.gemini_api_key.clone(),
    ));

    let app_state = api::AppState {
        chatbot_repo,
        store,
        llm,
        jwt_secret: config.jwt_secret.clone(),
        admin_token: config.admin_token.clone(),
    };

    let app = api::create_app(app_state)
        .layer(SentryHttpLayer::new().enable_transaction())
        .layer(NewSentryLayer::<Request<Body>>::new_from_top());

    let port = config.port;
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("Listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
