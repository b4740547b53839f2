use fillout_attio_relay::{app, config::Config, obs};

/// Main entry point for the long-running server.
///
/// Initializes tracing, loads configuration (failing fast when required
/// values are missing), builds the router and serves it on `PORT`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    obs::init_tracing();

    let config = Config::from_env()?;
    let port = config.port;

    let state = app::build_state(config)?;
    let router = app::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
