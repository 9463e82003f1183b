//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the CodeVerse core:
//! - Logging and tracing infrastructure
//! - Composition-root configuration
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other core modules depend
//! on. It establishes the logging conventions, configuration validation, and
//! event broadcasting mechanisms used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::CoreConfig;
pub use error::{Error, Result};
pub use events::EventBus;
