#![deny(missing_docs)]

//! Core library for the memevox proxy server.

/// HTTP routing and REST handlers.
pub mod api;
/// Audio artifact naming and persistence.
pub mod audio;
/// Environment-driven configuration management.
pub mod config;
/// Upstream meme knowledge-base client.
pub mod kym;
/// Structured logging and tracing setup.
pub mod logging;
/// Proxy metrics helpers.
pub mod metrics;
/// Proxy service coordinating upstream clients and storage.
pub mod service;
/// Clean-text extraction from scraped entries.
pub mod text;
/// Speech synthesis client abstraction and adapters.
pub mod tts;
