//! Counsel Swarm - Phased multi-agent counseling orchestrator
//!
//! A lead counselor agent talks with the user while a panel of specialist
//! agents analyzes each turn. The lead agent's strategy moves through
//! Exploration, Insight and Action as the conversation progresses.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
