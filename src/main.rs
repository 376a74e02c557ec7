use clap::Parser;
use statgate::server::run_server;
use statgate::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gateway", version, about = "Authentication and rate-limit gateway")]
struct Args {
    /// Configuration file (YAML); environment variables override it
    #[arg(short, long, env = "STATGATE_CONFIG")]
    config: Option<String>,
}

#[actix_web::main]
async fn main() -> statgate::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    run_server(config).await
}
