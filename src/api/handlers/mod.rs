pub mod ab_tests;
pub mod auth;
pub mod drive;
pub mod email;
pub mod feeds;
pub mod logs;
pub mod senders;
pub mod sms;
pub mod videos;
pub mod webhooks;
