use std::{
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    process::exit,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use forbo::{
    AppState, AttachmentStore, SiteConfig, build_router, graceful_shutdown, logging_middleware,
    open_store,
};

/// The web server for forbo.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, default_value = "forbo.db")]
    db_path: PathBuf,

    /// File path to the JSON site configuration, created with defaults if missing.
    #[arg(long, default_value = "config.json")]
    config_path: PathBuf,

    /// Directory where invoice attachments are stored.
    #[arg(long, default_value = "invoices")]
    invoice_dir: PathBuf,

    /// A database to copy when the database at `db_path` has to be created.
    #[arg(long)]
    template_path: Option<PathBuf>,

    /// The address to listen on.
    #[arg(short, long, default_value = "127.0.0.1")]
    address: IpAddr,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 8888)]
    port: u16,

    /// Log every request and response body.
    #[arg(long)]
    log_bodies: bool,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let site_config = match SiteConfig::load_or_create(&args.config_path) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Could not load the site configuration: {error}");
            exit(1);
        }
    };

    let conn = match open_store(&args.db_path, args.template_path.as_deref()) {
        Ok(conn) => conn,
        Err(error) => {
            tracing::error!("Could not open the database {}: {error}", args.db_path.display());
            exit(1);
        }
    };

    let app_state = match AppState::new(conn, site_config, AttachmentStore::new(&args.invoice_dir))
    {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize the app state: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(app_state);
    let router = if args.log_bodies {
        router.layer(middleware::from_fn(logging_middleware))
    } else {
        router
    };
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::new(args.address, args.port);
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
    {
        Ok(file) => file,
        Err(error) => {
            eprintln!("Could not create log file: {error}");
            exit(1);
        }
    };

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
