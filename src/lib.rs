pub mod autoembed;
pub mod birthday;
pub mod cache;
pub mod commands;
pub mod config;
pub mod converter;
pub mod db;
pub mod embeds;
pub mod i18n;
pub mod logging;
pub mod providers;
pub mod relations;
pub mod romaji;
pub mod utilities;

use std::sync::Arc;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub providers: Arc<providers::Providers>,
    pub db: db::Database,
    /// When the framework finished setup, for `/stats`
    pub started_at: chrono::DateTime<chrono::Utc>,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
