// Infrastructure layer module
// Database adapters and external service integrations
// Follows Hexagonal Architecture

pub mod clients;
pub mod repositories;
