//! Rent Scout - Telegram bot for rental apartment search
//!
//! Walks each user through a short filter questionnaire, hands the filters to
//! the search backend and lets them like or skip the resulting listings.

mod api;
mod backend;
mod config;
mod keyboards;
mod messages;
mod runtime;
mod state_machine;
mod telegram;

use backend::{HttpBackend, LoggingBackend};
use config::Config;
use runtime::Controller;
use std::sync::Arc;
use telegram::TelegramMessenger;
use teloxide::Bot;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rent_scout=info,tower_http=info,teloxide=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    tracing::info!(
        base_url = %config.api_base_url,
        city = %config.city,
        feed_limit = config.feed_limit,
        steps = ?config.flow.enabled_steps().collect::<Vec<_>>(),
        "Configuration loaded"
    );

    let backend = LoggingBackend::new(HttpBackend::new(
        &config.api_base_url,
        config.backend_timeout,
        config.state_timeout,
    )?);
    let bot = Bot::new(&config.bot_token);
    let controller = Arc::new(Controller::new(
        config.flow_context(),
        backend,
        TelegramMessenger::new(bot.clone()),
    ));

    let shutdown = CancellationToken::new();

    // A bind failure aborts startup
    let listener = api::bind(config.port).await.map_err(|e| {
        tracing::error!(port = config.port, error = %e, "Failed to bind health listener");
        e
    })?;
    let health = tokio::spawn(api::serve(listener, shutdown.clone()));

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    telegram::run(bot, controller.clone(), shutdown.clone()).await;

    // Polling also stops on its own if Telegram rejects the token
    shutdown.cancel();
    match health.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Health listener failed"),
        Err(e) => tracing::error!(error = %e, "Health listener task panicked"),
    }

    tracing::info!(
        sessions = controller.sessions().count().await,
        "Shut down"
    );
    Ok(())
}

/// Returns on SIGTERM or SIGINT
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            }
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM - shutting down");
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            }
            tracing::info!("Received SIGINT - shutting down");
        }
    }
}
