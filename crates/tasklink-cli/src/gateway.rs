//! `tasklink run`: the long-running process.
//!
//! Startup sequence:
//! 1. Record the start time (older messages are history)
//! 2. Load and validate config
//! 3. Establish the WhatsApp session (pair or reconnect)
//! 4. Build the Airtable sink, notifier and event router
//! 5. Bind the health endpoint
//! 6. Run: `tokio::select!` of the router and SIGINT/SIGTERM
//! 7. Disconnect from the bridge
//!
//! A lost or logged-out session ends the process with an error so the host
//! restarts it; the health endpoint goes down with it.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use colored::Colorize;
use tracing::{error, info, warn};

use tasklink_channels::{
    BridgeConnection, Connection, Notifier, OnQrCodeFn, SessionError, SessionManager,
};
use tasklink_core::bus::queue::EventBus;
use tasklink_core::config::load_config;
use tasklink_core::session::SessionStore;
use tasklink_core::utils::expand_tilde;
use tasklink_relay::{AirtableSink, TaskSink};
use tasklink_router::{AppContext, EventRouter, RouterExit};

use crate::{health, helpers};

/// Inbound event buffer between the bridge reader and the router.
const EVENT_BUS_CAPACITY: usize = 100;

/// Run until a shutdown signal arrives or startup fails.
pub async fn run() -> Result<()> {
    // 1. Anything timestamped before this is ignored
    let started_at = Utc::now();
    helpers::print_banner();

    // 2. Config
    let config = load_config(None);
    if let Err(e) = config.validate() {
        helpers::print_fatal(&e.to_string(), "Run `tasklink onboard`, then edit the config file.");
        return Err(e.into());
    }

    // 3. Session
    let bus = Arc::new(EventBus::new(EVENT_BUS_CAPACITY));
    let connection = Arc::new(BridgeConnection::new(
        config.session.bridge_url.clone(),
        Some(config.session.connect_timeout),
        bus.sender(),
    ));
    let store = SessionStore::new(expand_tilde(&config.session.path));
    let on_qr_code: OnQrCodeFn = Arc::new(|code: &str| helpers::print_qr_code(code));

    let mut sessions = SessionManager::new(store, connection.clone(), on_qr_code);
    let established = sessions.establish().await;
    let session = match established {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, state = ?sessions.state(), "failed to establish whatsapp session");
            helpers::print_fatal(&e.to_string(), &session_hint(&e, connection.bridge_url()));
            connection.disconnect().await;
            return Err(e.into());
        }
    };

    // 4. Relay + router
    let sink = AirtableSink::new(&config.airtable).context("failed to create airtable sink");
    let sink: Arc<dyn TaskSink> = Arc::new(disconnect_on_err(connection.as_ref(), sink).await?);
    let notifier = Notifier::new(connection.clone(), config.owner.jid.clone());
    let router = Arc::new(EventRouter::new(AppContext::new(started_at, sink.clone(), notifier)));

    // 5. Health endpoint
    let listener = health::bind(&config.health.host, config.health.port).await;
    let listener = disconnect_on_err(connection.as_ref(), listener).await?;
    let health_task = tokio::spawn(health::serve(listener));

    let identity = session.identity.as_deref().unwrap_or("(unknown)");
    info!(
        jid = identity,
        sink = sink.display_name(),
        owner = %config.owner.jid,
        "tasklink starting"
    );
    println!("  {} connected as {}", "✓".green(), identity);
    println!("  Owner:   {}", config.owner.jid);
    println!("  Health:  http://{}:{}/", config.health.host, config.health.port);
    println!();
    println!("  Ctrl+C to stop");
    println!();

    // 6. Serve until signalled or the session ends
    let exit = tokio::select! {
        exit = router.clone().run(bus.clone()) => Some(exit),
        _ = shutdown_signal() => {
            println!();
            println!("  Shutting down...");
            None
        }
    };

    // 7. Graceful disconnect; in-flight handlers are not awaited
    connection.disconnect().await;
    health_task.abort();

    match exit {
        Some(RouterExit::SessionEnded { reason }) => {
            helpers::print_fatal(
                &format!("WhatsApp session ended: {reason}"),
                "Restart tasklink to reconnect.",
            );
            bail!("whatsapp session ended: {reason}");
        }
        Some(RouterExit::BusClosed) => {
            warn!("event router exited");
            bail!("event bus closed");
        }
        None => {
            println!("  Stopped. Goodbye!");
            Ok(())
        }
    }
}

/// Pass `result` through, closing the bridge connection first on error.
async fn disconnect_on_err<T>(connection: &dyn Connection, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        error!(error = %e, "startup failed after session was established");
        connection.disconnect().await;
    }
    result
}

/// Operator guidance for a failed session start.
fn session_hint(err: &SessionError, bridge_url: &str) -> String {
    match err {
        SessionError::CredentialsRejected {
            backup: Some(path), ..
        } => format!(
            "Old credentials moved to {}. Restart to scan a new QR code.",
            path.display()
        ),
        SessionError::CredentialsRejected { backup: None, .. } => {
            "Restart to scan a new QR code.".to_string()
        }
        SessionError::QrTimeout | SessionError::PairingAborted => {
            "Restart to get a new QR code.".to_string()
        }
        SessionError::Pairing(_) | SessionError::Connect(_) => format!(
            "Check that the WhatsApp bridge is running at {bridge_url}. Stored credentials were kept."
        ),
        SessionError::Store(_) => {
            "Move the credential file aside to pair again from scratch.".to_string()
        }
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
