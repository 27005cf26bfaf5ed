//! # voicebridged: voicebridge daemon
//!
//! Composition root that wires the memory hub, the event bus and the
//! smart-home bridge together, then answers one directive.
//!
//! ## Responsibilities
//! - Load configuration (`voicebridge.toml`, env vars)
//! - Initialise `tracing` with the configured filter
//! - Seed the in-memory hub from the configured states file
//! - Read one directive envelope from the path given as first argument, or
//!   from stdin
//! - Print the response envelope on stdout
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;
use voicebridge_adapter_memory::InMemoryStateStore;
use voicebridge_app::event_bus::InProcessEventBus;
use voicebridge_app::smart_home::SmartHome;
use voicebridge_domain::id::ContextId;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    // Hub
    let store = match &config.store.states {
        Some(path) => {
            let document = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading states from {}", path.display()))?;
            InMemoryStateStore::from_json(&document)
                .with_context(|| format!("seeding states from {}", path.display()))?
        }
        None => InMemoryStateStore::default(),
    };
    let store = if config.store.effects {
        store.with_effects()
    } else {
        store
    };

    // Event bus
    let event_bus = InProcessEventBus::new(16);
    let mut events = event_bus.subscribe();

    let bridge = SmartHome::new(store, event_bus, config.bridge_config());

    let request = match std::env::args().nth(1) {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading directive from {path}"))?,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("reading directive from stdin")?;
            buffer
        }
    };
    let request: serde_json::Value =
        serde_json::from_str(&request).context("directive is not valid JSON")?;

    let response = bridge
        .handle_message(request, Some(ContextId::new()))
        .await
        .context("handling directive")?;

    while let Ok(event) = events.try_recv() {
        tracing::info!(event_id = %event.id, entity_id = ?event.entity_id, "event published");
    }

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
