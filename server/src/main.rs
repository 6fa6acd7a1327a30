use anyhow::Result;
use axum::Router;
use clap::Parser;
use invindex::CodecKind;
use server::{build_app, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "index-server", about = "Serve conjunctive queries over a dumped inverted index")]
struct Args {
    /// Dumped index file
    #[arg(long, default_value = "./index.bin")]
    index: PathBuf,
    /// Codec the index was dumped with
    #[arg(long, default_value_t = CodecKind::Array)]
    codec: CodecKind,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = ServerConfig::new(args.index, args.codec).with_env();
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
