//! Voteish console runner.
//!
//! Reads inbound events as JSON lines on stdin and writes outbound payloads
//! as JSON lines on stdout. Logs go to stderr.

use std::sync::Arc;

use tokio::io::BufReader;
use tokio::sync::watch;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use voteish::adapters::{ConsoleEventSource, ConsoleNotifier, InMemorySessionStore, SessionSweeper};
use voteish::application::{CreateSessionHandler, HandleActionHandler, NotificationDispatcher};
use voteish::config::{AppConfig, LogFormat, LoggingConfig};

fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = config.env_filter()?;

    let fmt_layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().and_then(|config| {
        config.validate()?;
        Ok(config)
    })?;
    init_logging(&config.logging)?;

    let deck = config.voting.deck()?;
    tracing::info!(
        ttl_secs = config.sessions.ttl_secs,
        sweep_interval_secs = config.sessions.sweep_interval_secs,
        deck = ?deck.options(),
        "Starting voteish"
    );

    let store = Arc::new(InMemorySessionStore::new(config.sessions.ttl()));
    let dispatcher = NotificationDispatcher::new(Arc::new(ConsoleNotifier::stdout()));
    let source = ConsoleEventSource::new(
        Arc::new(CreateSessionHandler::new(
            store.clone(),
            dispatcher.clone(),
            deck,
        )),
        Arc::new(HandleActionHandler::new(store.clone(), dispatcher)),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper = SessionSweeper::new(store, config.sessions.sweep_interval());
    let sweeper_rx = shutdown_rx.clone();
    let sweeper_task = tokio::spawn(async move { sweeper.run(sweeper_rx).await });

    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received");
            let _ = ctrl_c_tx.send(true);
        }
    });

    let result = source
        .run(BufReader::new(tokio::io::stdin()), shutdown_rx)
        .await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper_task.await {
        tracing::error!(error = %e, "Session sweeper task failed");
    }

    tracing::info!("Voteish stopped");
    result.map_err(Into::into)
}
