pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod logging;
pub mod markdown;
pub mod models;
pub mod onboarding;
pub mod projection;
