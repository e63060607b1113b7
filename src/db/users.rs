use super::tsv::{fmt_opt, opt_string, parse_opt, parse_req, Row, TsvFile};
use super::DatabaseError;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// One registered Discord user and the platform accounts they linked.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserRecord {
    pub discord_id: u64,
    pub discord_username: String,
    /// Unix seconds the Discord account was created.
    pub discord_joined: i64,
    pub mal_username: String,
    pub mal_id: Option<u64>,
    pub mal_joined: Option<i64>,
    pub registered_at: i64,
    pub registered_guild: Option<u64>,
    pub registered_by: u64,
    pub anilist_username: Option<String>,
    pub anilist_id: Option<u64>,
    pub lastfm_username: Option<String>,
    pub shikimori_username: Option<String>,
    pub shikimori_id: Option<u64>,
}

impl Row for UserRecord {
    const COLUMNS: &'static [&'static str] = &[
        "discordId",
        "discordUsername",
        "discordJoined",
        "malUsername",
        "malId",
        "malJoined",
        "registeredAt",
        "registeredGuild",
        "registeredBy",
        "anilistUsername",
        "anilistId",
        "lastfmUsername",
        "shikimoriUsername",
        "shikimoriId",
    ];

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.discord_id.to_string(),
            self.discord_username.clone(),
            self.discord_joined.to_string(),
            self.mal_username.clone(),
            fmt_opt(&self.mal_id),
            fmt_opt(&self.mal_joined),
            self.registered_at.to_string(),
            fmt_opt(&self.registered_guild),
            self.registered_by.to_string(),
            fmt_opt(&self.anilist_username),
            fmt_opt(&self.anilist_id),
            fmt_opt(&self.lastfm_username),
            fmt_opt(&self.shikimori_username),
            fmt_opt(&self.shikimori_id),
        ]
    }

    fn from_fields(f: &[String]) -> Result<Self, String> {
        Ok(Self {
            discord_id: parse_req(&f[0], "discordId")?,
            discord_username: f[1].clone(),
            discord_joined: parse_opt(&f[2], "discordJoined")?.unwrap_or_default(),
            mal_username: f[3].clone(),
            mal_id: parse_opt(&f[4], "malId")?,
            mal_joined: parse_opt(&f[5], "malJoined")?,
            registered_at: parse_opt(&f[6], "registeredAt")?.unwrap_or_default(),
            registered_guild: parse_opt(&f[7], "registeredGuild")?,
            registered_by: parse_opt(&f[8], "registeredBy")?.unwrap_or_default(),
            anilist_username: opt_string(&f[9]),
            anilist_id: parse_opt(&f[10], "anilistId")?,
            lastfm_username: opt_string(&f[11]),
            shikimori_username: opt_string(&f[12]),
            shikimori_id: parse_opt(&f[13], "shikimoriId")?,
        })
    }
}

/// Platforms a registered user may link after `/register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum LinkedPlatform {
    #[name = "AniList"]
    Anilist,
    #[name = "Last.fm"]
    Lastfm,
    #[name = "Shikimori"]
    Shikimori,
}

/// Account details stored by `/platform link`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformLink {
    pub username: String,
    pub id: Option<u64>,
}

/// Registry of Discord users backed by `database.csv`.
///
/// Each mutation rewrites the whole file; the mutex only serializes writers
/// inside this process.
#[derive(Clone)]
pub struct UserRegistry {
    file: TsvFile<UserRecord>,
    lock: Arc<Mutex<()>>,
}

impl UserRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: TsvFile::new(path),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn check_if_registered(&self, discord_id: u64) -> Result<bool, DatabaseError> {
        Ok(self.get_user(discord_id)?.is_some())
    }

    pub fn get_user(&self, discord_id: u64) -> Result<Option<UserRecord>, DatabaseError> {
        let _guard = self.lock.lock().unwrap();
        Ok(self
            .file
            .load()?
            .into_iter()
            .find(|u| u.discord_id == discord_id))
    }

    pub fn count(&self) -> Result<usize, DatabaseError> {
        let _guard = self.lock.lock().unwrap();
        Ok(self.file.load()?.len())
    }

    pub fn save_to_database(&self, record: UserRecord) -> Result<(), DatabaseError> {
        let _guard = self.lock.lock().unwrap();
        let mut users = self.file.load()?;
        if users.iter().any(|u| u.discord_id == record.discord_id) {
            return Err(DatabaseError::AlreadyRegistered(record.discord_id));
        }

        info!(
            "Registering user {} as MAL user {}",
            record.discord_id, record.mal_username
        );
        users.push(record);
        self.file.store(&users)
    }

    pub fn drop_user(&self, discord_id: u64) -> Result<(), DatabaseError> {
        let _guard = self.lock.lock().unwrap();
        let mut users = self.file.load()?;
        let before = users.len();
        users.retain(|u| u.discord_id != discord_id);
        if users.len() == before {
            return Err(DatabaseError::NotRegistered(discord_id));
        }

        info!("Unregistered user {}", discord_id);
        self.file.store(&users)
    }

    /// Link (`Some`) or unlink (`None`) a platform account.
    pub fn update_platform(
        &self,
        discord_id: u64,
        platform: LinkedPlatform,
        link: Option<PlatformLink>,
    ) -> Result<UserRecord, DatabaseError> {
        let _guard = self.lock.lock().unwrap();
        let mut users = self.file.load()?;
        let user = users
            .iter_mut()
            .find(|u| u.discord_id == discord_id)
            .ok_or(DatabaseError::NotRegistered(discord_id))?;

        let (username, id) = match link {
            Some(l) => (Some(l.username), l.id),
            None => (None, None),
        };
        match platform {
            LinkedPlatform::Anilist => {
                user.anilist_username = username;
                user.anilist_id = id;
            }
            LinkedPlatform::Lastfm => {
                user.lastfm_username = username;
            }
            LinkedPlatform::Shikimori => {
                user.shikimori_username = username;
                user.shikimori_id = id;
            }
        }

        debug!("Updated {:?} link for user {}", platform, discord_id);
        let updated = user.clone();
        self.file.store(&users)?;
        Ok(updated)
    }
}
