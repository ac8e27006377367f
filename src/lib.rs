//! Anton Snake - a Snake agent that learns from its own play
//!
//! This library provides:
//! - Headless game simulation (game module)
//! - Sensing, decision, feedback logging and training (anton module)
//! - Rolling play statistics (metrics module)
//! - Train, play and combined execution modes (modes module)
//! - JSON application configuration (config module)

pub mod anton;
pub mod config;
pub mod game;
pub mod metrics;
pub mod modes;
