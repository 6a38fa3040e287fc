use std::net::{Ipv4Addr, SocketAddr};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use yaniv_server::server::{run_server, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "yaniv_server")]
#[command(about = "Multi-room Yaniv card game server", long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = yaniv_server::config::DEFAULT_PORT)]
    port: u16,

    /// Postgres URL; omit to run memory-only
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Toggle structured (JSON) logs
    #[arg(long, env = "SERVER_LOG_JSON", default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let config = ServerConfig {
        bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port)),
        database_url: args.database_url.filter(|url| !url.is_empty()),
    };
    run_server(config).await
}
