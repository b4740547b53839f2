//! Fillout → Attio webhook relay.
//!
//! Receives Fillout form submissions, finds the Attio company matching the
//! submitted domain and its entry in a configured list, and patches that entry
//! with the mapped answers.
//!
//! # Modules
//!
//! - `app`: Router and shared state construction.
//! - `attio_client`: Attio v2 API client.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `field_mapping`: Question → attribute mapping.
//! - `handlers`: HTTP request handlers.
//! - `obs`: Observability and logging.
//! - `relay`: Per-request orchestration.
//! - `webhook_models`: Fillout payload models and normalization.

pub mod app;
pub mod attio_client;
pub mod config;
pub mod errors;
pub mod field_mapping;
pub mod handlers;
pub mod obs;
pub mod relay;
pub mod webhook_models;
