//! Sitepulse - consent-gated visitor analytics for a marketing site
//!
//! The library covers both halves of the system: the visitor-side tracker
//! (identity, consent, debounced event batching, page-view recording) and the
//! service that stores what it sends and aggregates it for the admin report.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `identity`: session ids, device fingerprints and key-value storage
//! - `consent`: cookie consent state and the gate every write checks
//! - `tracking`: event batcher, debounce timer, page-view recorder
//! - `storage`: SeaORM and in-memory stores
//! - `analytics`: trailing-window admin report
//! - `services`: chat gateway proxy
//! - `api`: HTTP handlers and routes
//! - `interfaces`: CLI commands
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging

pub mod analytics;
#[cfg(feature = "server")]
pub mod api;
pub mod cli;
pub mod config;
pub mod consent;
pub mod errors;
pub mod identity;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod tracking;
