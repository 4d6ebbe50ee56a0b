use bridge::{AppState, config::Config, db, logging, retention};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = Config::from_env()?;
    let db_pool = db::connect(&config.database_url, config.max_connections).await?;
    let app_state = AppState::new(db_pool, config.clone());

    let sweeper = retention::spawn(app_state.rooms.clone(), config.sweep_every, config.retention);
    let app = bridge::app(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "bridge listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("bridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
