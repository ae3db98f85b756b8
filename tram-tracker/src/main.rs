use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tram_tracker::config::{ConfigStore, JsonFileStore};
use tram_tracker::engine::TrackingEngine;
use tram_tracker::golemio::{GolemioConfig, HttpFetch, MockFetcher, ReqwestFetcher};
use tram_tracker::secrets::Secrets;
use tram_tracker::web::{AppState, create_router};

/// live tram departures from the Golemio departure board
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// config file to use instead of the one in the local data directory
    #[clap(long)]
    config: Option<PathBuf>,

    /// env file holding GOLEMIO_API_KEY, tried before ./.env
    #[clap(long)]
    env_file: Option<PathBuf>,

    /// address to serve the widget on
    #[clap(long, default_value = "127.0.0.1:3000")]
    listen: SocketAddr,

    /// fetch once, print the summary and exit
    #[clap(long)]
    once: bool,

    /// serve a recorded departure board instead of calling Golemio
    #[clap(long, value_name = "JSON")]
    mock: Option<PathBuf>,

    /// directory served under /static
    #[clap(long, default_value = "static")]
    static_dir: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let secrets = Secrets::load(&env_file_candidates(cli.env_file.as_deref()));
    match secrets.source() {
        Some(path) => info!(?path, "loaded env file"),
        None => info!("no env file found, using process environment"),
    }

    let config_path = cli
        .config
        .clone()
        .or_else(JsonFileStore::default_path)
        .expect("Could not determine the local data directory; pass --config");
    let store = JsonFileStore::new(config_path);
    info!(path = ?store.path(), "using config file");

    let golemio = GolemioConfig::default();

    match cli.mock.clone() {
        Some(path) => {
            let fetcher =
                MockFetcher::from_file(&path).expect("Failed to load mock departure board");
            info!(?path, "serving recorded departures");
            start(cli, fetcher, store, secrets, golemio).await;
        }
        None => {
            let fetcher = ReqwestFetcher::new(&golemio).expect("Failed to create HTTP client");
            start(cli, fetcher, store, secrets, golemio).await;
        }
    }
}

/// Env files to try, in order.
fn env_file_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = explicit.map(Path::to_path_buf).into_iter().collect();
    candidates.push(PathBuf::from(".env"));

    // Next to the executable, for installs started from elsewhere
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(".env"));
    }

    candidates
}

async fn start<F, S>(cli: Cli, fetcher: F, store: S, secrets: Secrets, golemio: GolemioConfig)
where
    F: HttpFetch + 'static,
    S: ConfigStore + 'static,
{
    let engine = TrackingEngine::new(fetcher, store, secrets, golemio);

    if cli.once {
        engine.tick().await;
        let state = engine.current();
        println!("{}", state.summary());
        if !state.has_data() {
            std::process::exit(1);
        }
        return;
    }

    // Poll in the background; the router only reads published states
    let runner = engine.clone();
    tokio::spawn(async move { runner.run().await });

    let app = create_router(AppState::new(engine.subscribe()), &cli.static_dir);

    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .expect("Failed to bind listen address");
    println!("Tram tracker listening on http://{}", cli.listen);
    println!();
    println!("Endpoints:");
    println!("  GET  /           - Widget");
    println!("  GET  /api/state  - Current arrival state (JSON)");
    println!("  GET  /health     - Health check");

    axum::serve(listener, app).await.expect("Server error");
}
