use tokio::net::TcpListener;
use todo_server::config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{addr}");
    todo_server::run(listener, config).await?;
    Ok(())
}
