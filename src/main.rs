use std::sync::Arc;

use anyhow::Context;

use geotextile_assist::channels::{CliChannel, dialogue_routes};
use geotextile_assist::config::AssistConfig;
use geotextile_assist::dialogue::RevealPacer;
use geotextile_assist::session::DialogueSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AssistConfig::from_env();

    let serve = std::env::args().nth(1).is_some_and(|arg| arg == "serve");

    eprintln!("🧵 Geotextile Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.gateway.endpoint());

    // ── Session ──────────────────────────────────────────────────────────
    let session = Arc::new(DialogueSession::from_config(&config)?);
    match &config.catalog_path {
        Some(path) => eprintln!("   Catalog: {}", path.display()),
        None => eprintln!("   Catalog: built-in"),
    }

    if serve {
        let app = dialogue_routes(Arc::clone(&session));
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
            .await
            .with_context(|| format!("binding port {}", config.http_port))?;
        eprintln!("   Dialogue API: http://0.0.0.0:{}/api/dialogue\n", config.http_port);
        tracing::info!(port = config.http_port, "Dialogue server started");
        axum::serve(listener, app).await?;
    } else {
        eprintln!("   Type a number to choose, /restart to start over, /quit to exit.\n");
        let cli = CliChannel::new(session, RevealPacer::new(config.reveal_delay));
        cli.run().await?;
    }

    Ok(())
}
