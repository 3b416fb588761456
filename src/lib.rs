//! CGK Platform API Library
//!
//! Multi-tenant commerce services: shipping A/B tests, transactional email,
//! platform logs, merchant feeds, video and Drive asset ingestion.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod services;
pub mod state;
