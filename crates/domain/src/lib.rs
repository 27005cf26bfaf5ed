//! # voicebridge-domain
//!
//! Pure domain model for the voicebridge smart-home bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **entity records** as the hub stores them (`entity_id`, state, attributes)
//! - Translate raw records into **typed per-domain views** (lights, fans, thermostats, …)
//! - Define **service calls** (commands such as `light.turn_on`) and **events**
//! - Temperature unit conversions, colour maths and the exposure filter
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod color;
pub mod entity;
pub mod event;
pub mod filter;
pub mod service;
pub mod temperature;
