// Domain layer module exports
// Pure types and rules; no database or HTTP concerns
// Persistence is reached only through the repository traits

pub mod ab_test;
pub mod contact;
pub mod drive;
pub mod email;
pub mod feed;
pub mod platform_log;
pub mod repositories;
pub mod tenant;
pub mod user;
pub mod validation;
pub mod video;
