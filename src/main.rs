use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lipi_relay::{create_router, AppState, Config, DeepgramConnector, Lexicon, Transliterator};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lipi-relay", version, about = "Speech relay with live Hinglish transliteration")]
struct Args {
    /// Path to the configuration file (Config::load appends the extension)
    #[arg(short, long, default_value = "config/lipi-relay")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Starting {}", cfg.service.name);

    let lexicon = match &cfg.translit.lexicon_path {
        Some(path) => Lexicon::load(Path::new(path))?,
        None => Lexicon::builtin()?,
    };
    info!("Loaded transliteration lexicon: {} entries", lexicon.len());

    if cfg.upstream.api_key.is_none() {
        warn!("No recognition API key configured; sessions will fail to open");
    }

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let state = AppState::new(cfg, Transliterator::new(lexicon), Arc::new(DeepgramConnector));
    let router = create_router(state)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, router)
        .await
        .context("server exited with an error")?;

    Ok(())
}
