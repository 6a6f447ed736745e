// src/main.rs
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use hamtrainer::{app, config, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    // ==== Config (missing CSRF_KEY stops us here) ====
    let cfg = config::Config::from_env()?;
    let app = app::build_app(&cfg)?;

    // ==== Start server ====
    let listener = TcpListener::bind(&cfg.bind)
        .await
        .with_context(|| format!("bind {}", cfg.bind))?;
    info!("listening on http://{}", cfg.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
