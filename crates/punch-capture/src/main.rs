//! Attendance kiosk binary.
//!
//! Scans the camera snapshot continuously, punches recognized people in the
//! configured direction and resumes scanning a few seconds after each punch.

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use punch_capture::{FileFrameSource, GateEvent, KioskConfig, LiveScanner};
use punch_client::ApiClient;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Install rustls crypto provider (required for rustls 0.23+)
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        eprintln!("Failed to install rustls crypto provider");
        std::process::exit(1);
    }

    init_tracing();

    info!("Starting punch-kiosk");

    if let Err(e) = run().await {
        error!("Kiosk error: {:#}", e);
        std::process::exit(1);
    }

    info!("Kiosk shutdown complete");
}

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    if let Ok(directive) = "punch=info".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run() -> anyhow::Result<()> {
    let config = KioskConfig::from_env();
    info!("Kiosk config: {:?}", config);

    let client = ApiClient::from_env().context("Failed to create API client")?;
    info!("Backend: {}", client.config().base_url);

    let scanner = LiveScanner::new(FileFrameSource::new(&config.frame_path), client, &config.scan);
    let mut events = scanner.subscribe();
    scanner.start();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut resume_at: Option<Instant> = None;

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                signal.context("Failed to listen for shutdown signal")?;
                info!("Received shutdown signal");
                break;
            }
            event = events.recv() => match event {
                Ok(GateEvent::Accepted { recognition, stale: false }) => {
                    info!(
                        mode = %recognition.mode,
                        user = %recognition.user.name,
                        role = recognition.user.role.as_str(),
                        at = %recognition.server_timestamp,
                        "{}",
                        recognition.message
                    );
                    resume_at = Some(Instant::now() + config.resume_after);
                }
                Ok(GateEvent::Accepted { recognition, stale: true }) => {
                    debug!(user = %recognition.user.name, "Late acceptance, scanner state unchanged");
                }
                Ok(GateEvent::Rejected(_)) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Dropped {} scanner events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::time::sleep_until(resume_at.unwrap_or_else(Instant::now)), if resume_at.is_some() => {
                resume_at = None;
                scanner.resume();
            }
        }
    }

    scanner.stop();
    Ok(())
}
