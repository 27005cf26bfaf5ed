//! # voicebridge-app
//!
//! Application layer - **port definitions** (traits) and the smart-home bridge.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `StateStore`: read hub state records and call hub services
//!   - `ExposurePolicy`: decide which entities become endpoints
//!   - `EventPublisher`: publish observable events
//! - Provide the **driving/inbound** use-case: [`smart_home::SmartHome`],
//!   which turns one voice-assistant directive into exactly one response
//!   envelope
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `voicebridge-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod smart_home;
