mod routes;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use stockfeed_lib::stockfeed_api::ChartClient;
use stockfeed_lib::{Fetcher, QuoteStore, Settings};

use crate::routes::AppState;

#[derive(Parser)]
#[command(name = "stockfeed")]
#[command(about = "Fetch stock OHLCV quotes, persist them, and serve them over HTTP")]
struct Cli {
    /// Address to bind the HTTP server to (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stockfeed_server=info".parse().unwrap())
                .add_directive("stockfeed_lib=info".parse().unwrap())
                .add_directive("stockfeed_api=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    let store = QuoteStore::open(&settings.db_path)?;
    store.init()?;
    let store = Arc::new(Mutex::new(store));

    let client = ChartClient::new()?;
    let fetcher = Arc::new(Fetcher::new(
        client,
        Arc::clone(&store),
        settings.csv_path.clone(),
    ));

    let state = AppState {
        fetcher,
        store,
        default_ticker: settings.default_ticker.clone(),
    };

    let bind_addr = cli.bind.unwrap_or(settings.bind_addr);
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);
    axum::serve(listener, routes::router(state)).await?;

    Ok(())
}
