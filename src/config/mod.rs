//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, BridgeConfig, AppConfig, ChannelConfig)
//! - [`terminal`]: Seed values for the mock terminal (TerminalConfig, DrmSystemConfig)
//! - [`validation`]: Startup checks that collect every error found

mod defaults;
mod terminal;
mod types;
pub mod validation;

pub use terminal::TerminalConfig;
pub use types::{AppConfig, ChannelConfig, Config};
pub use validation::validate;
