use dotenvy::dotenv;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub dev_guild_id: Option<u64>,
    pub status_message: String,
    pub user_agent: String,

    // Provider credentials
    pub simkl_client_id: Option<String>,
    pub trakt_api_key: Option<String>,
    pub rawg_api_key: Option<String>,
    pub lastfm_api_key: Option<String>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,

    // Storage
    pub database_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub log_dir: PathBuf,

    // Background tasks
    pub cache_sweep_interval: Duration,
    pub birthday_check_interval: Duration,

    /// Per-provider TTL overrides, keyed by provider directory name.
    pub cache_ttl_overrides: HashMap<String, Duration>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        let discord_token = env::var("DISCORD_TOKEN")
            .or_else(|_| env::var("BOT_TOKEN"))
            .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?;

        Ok(Config {
            discord_token,
            dev_guild_id: env::var("DEV_GUILD_ID").ok().and_then(|id| id.parse().ok()),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "/anime search".to_string()),
            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| {
                format!("shiori/{} (Discord bot)", env!("CARGO_PKG_VERSION"))
            }),

            simkl_client_id: optional("SIMKL_CLIENT_ID"),
            trakt_api_key: optional("TRAKT_API_KEY"),
            rawg_api_key: optional("RAWG_API_KEY"),
            lastfm_api_key: optional("LASTFM_API_KEY"),
            spotify_client_id: optional("SPOTIFY_CLIENT_ID"),
            spotify_client_secret: optional("SPOTIFY_CLIENT_SECRET"),

            database_dir: env::var("DATABASE_DIR")
                .unwrap_or_else(|_| "database".to_string())
                .into(),
            cache_dir: env::var("CACHE_DIR")
                .unwrap_or_else(|_| "cache".to_string())
                .into(),
            log_dir: env::var("LOG_DIR")
                .unwrap_or_else(|_| "logs".to_string())
                .into(),

            cache_sweep_interval: duration_var("CACHE_SWEEP_INTERVAL", "1h"),
            birthday_check_interval: duration_var("BIRTHDAY_CHECK_INTERVAL", "15m"),

            cache_ttl_overrides: Self::load_ttl_overrides(
                &env::var("CACHE_TTL_FILE").unwrap_or_else(|_| "cache_ttl.toml".to_string()),
            ),
        })
    }

    /// Read `provider = "1d"` pairs from a TOML file. A missing or unreadable
    /// file yields no overrides.
    pub fn load_ttl_overrides(path: &str) -> HashMap<String, Duration> {
        let Ok(content) = fs::read_to_string(path) else {
            return HashMap::new();
        };
        Self::parse_ttl_overrides(&content)
    }

    fn parse_ttl_overrides(content: &str) -> HashMap<String, Duration> {
        let raw: HashMap<String, String> = match toml::from_str(content) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Ignoring malformed cache TTL file: {}", e);
                return HashMap::new();
            }
        };

        raw.into_iter()
            .filter_map(|(provider, ttl)| match humantime::parse_duration(&ttl) {
                Ok(d) => Some((provider, d)),
                Err(e) => {
                    warn!("Invalid TTL '{}' for provider {}: {}", ttl, provider, e);
                    None
                }
            })
            .collect()
    }

    /// TTL for a provider, honouring `cache_ttl.toml`.
    pub fn cache_ttl(&self, provider: &str, default: Duration) -> Duration {
        self.cache_ttl_overrides
            .get(provider)
            .copied()
            .unwrap_or(default)
    }

    pub fn cache_root(&self, provider: &str) -> PathBuf {
        self.cache_dir.join(provider)
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn duration_var(key: &str, default: &str) -> Duration {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    humantime::parse_duration(&raw).unwrap_or_else(|_| {
        warn!("Invalid duration '{}' for {}, using {}", raw, key, default);
        humantime::parse_duration(default).unwrap_or(Duration::from_secs(3600))
    })
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("dev_guild_id", &self.dev_guild_id)
            .field("status_message", &self.status_message)
            .field("user_agent", &self.user_agent)
            .field("simkl_client_id", &redact(&self.simkl_client_id))
            .field("trakt_api_key", &redact(&self.trakt_api_key))
            .field("rawg_api_key", &redact(&self.rawg_api_key))
            .field("lastfm_api_key", &redact(&self.lastfm_api_key))
            .field("spotify_client_id", &redact(&self.spotify_client_id))
            .field("spotify_client_secret", &redact(&self.spotify_client_secret))
            .field("database_dir", &self.database_dir)
            .field("cache_dir", &self.cache_dir)
            .field("log_dir", &self.log_dir)
            .field("cache_sweep_interval", &self.cache_sweep_interval)
            .field("birthday_check_interval", &self.birthday_check_interval)
            .field("cache_ttl_overrides", &self.cache_ttl_overrides)
            .finish()
    }
}

/// Embed description limit is 4096 characters
pub const DISCORD_EMBED_LIMIT: usize = 4096;
/// Embed field value limit
pub const DISCORD_FIELD_LIMIT: usize = 1024;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_logic() {
        // 1. Missing token
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("BOT_TOKEN");
        assert!(Config::build().is_err(), "Should fail without a token");

        // 2. Legacy alias and defaults
        env::set_var("BOT_TOKEN", "alias_token");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "alias_token");
        assert_eq!(config.database_dir, PathBuf::from("database"));
        assert_eq!(config.cache_sweep_interval, Duration::from_secs(3600));

        // 3. Debug redaction
        env::set_var("DISCORD_TOKEN", "test_token");
        env::set_var("RAWG_API_KEY", "secret_rawg_key");
        let config = Config::build().unwrap();
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("test_token"));
        assert!(!debug_output.contains("secret_rawg_key"));
        assert!(debug_output.contains("[REDACTED]"));
        // AniList is queried anonymously, so no credential is read for it
        assert!(!debug_output.contains("anilist"));

        // 4. TTL overrides fall back to the provider default
        let mut config = config;
        config
            .cache_ttl_overrides
            .insert("jikan".to_string(), Duration::from_secs(5));
        assert_eq!(
            config.cache_ttl("jikan", Duration::from_secs(100)),
            Duration::from_secs(5)
        );
        assert_eq!(
            config.cache_ttl("kitsu", Duration::from_secs(100)),
            Duration::from_secs(100)
        );

        // Cleanup
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("BOT_TOKEN");
        env::remove_var("RAWG_API_KEY");
    }

    #[test]
    fn test_parse_ttl_overrides() {
        let parsed = Config::parse_ttl_overrides(
            r#"
anilist = "2d"
rawg = "12h"
broken = "soon"
"#,
        );
        assert_eq!(parsed.get("anilist"), Some(&Duration::from_secs(2 * 86400)));
        assert_eq!(parsed.get("rawg"), Some(&Duration::from_secs(12 * 3600)));
        assert!(!parsed.contains_key("broken"));
    }
}
