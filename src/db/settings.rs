use super::tsv::{parse_req, Row, TsvFile};
use super::DatabaseError;
use crate::i18n::Locale;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
struct LanguageRow {
    id: u64,
    language: String,
}

impl Row for LanguageRow {
    const COLUMNS: &'static [&'static str] = &["id", "language"];

    fn to_fields(&self) -> Vec<String> {
        vec![self.id.to_string(), self.language.clone()]
    }

    fn from_fields(f: &[String]) -> Result<Self, String> {
        Ok(Self {
            id: parse_req(&f[0], "id")?,
            language: f[1].trim().to_string(),
        })
    }
}

/// Language preferences for members (`member.csv`) and guilds (`server.csv`).
#[derive(Clone)]
pub struct SettingsStore {
    members: TsvFile<LanguageRow>,
    servers: TsvFile<LanguageRow>,
    lock: Arc<Mutex<()>>,
}

#[derive(Debug, Clone, Copy)]
pub enum Scope {
    Member,
    Server,
}

impl SettingsStore {
    pub fn new(database_dir: &Path) -> Self {
        Self {
            members: TsvFile::new(database_dir.join("member.csv")),
            servers: TsvFile::new(database_dir.join("server.csv")),
            lock: Arc::new(Mutex::new(())),
        }
    }

    fn file(&self, scope: Scope) -> &TsvFile<LanguageRow> {
        match scope {
            Scope::Member => &self.members,
            Scope::Server => &self.servers,
        }
    }

    pub fn get(&self, scope: Scope, id: u64) -> Result<Option<Locale>, DatabaseError> {
        let _guard = self.lock.lock().unwrap();
        let row = self.file(scope).load()?.into_iter().find(|r| r.id == id);
        Ok(row.and_then(|r| match r.language.parse() {
            Ok(locale) => Some(locale),
            Err(e) => {
                warn!("Ignoring stored language for {:?} {}: {}", scope, id, e);
                None
            }
        }))
    }

    pub fn set(&self, scope: Scope, id: u64, locale: Locale) -> Result<(), DatabaseError> {
        let _guard = self.lock.lock().unwrap();
        let file = self.file(scope);
        let mut rows = file.load()?;
        match rows.iter_mut().find(|r| r.id == id) {
            Some(row) => row.language = locale.code().to_string(),
            None => rows.push(LanguageRow {
                id,
                language: locale.code().to_string(),
            }),
        }
        file.store(&rows)
    }

    /// Returns whether a stored preference was removed.
    pub fn clear(&self, scope: Scope, id: u64) -> Result<bool, DatabaseError> {
        let _guard = self.lock.lock().unwrap();
        let file = self.file(scope);
        let mut rows = file.load()?;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            return Ok(false);
        }
        file.store(&rows)?;
        Ok(true)
    }

    /// Member preference, then guild preference, then the default.
    pub fn resolve_locale(&self, user_id: u64, guild_id: Option<u64>) -> Locale {
        let member = self.get(Scope::Member, user_id).unwrap_or_else(|e| {
            warn!("Failed to read member settings: {}", e);
            None
        });
        if let Some(locale) = member {
            return locale;
        }

        guild_id
            .and_then(|gid| {
                self.get(Scope::Server, gid).unwrap_or_else(|e| {
                    warn!("Failed to read server settings: {}", e);
                    None
                })
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());

        assert_eq!(store.resolve_locale(1, Some(100)), Locale::EnUs);

        store.set(Scope::Server, 100, Locale::IdId).unwrap();
        assert_eq!(store.resolve_locale(1, Some(100)), Locale::IdId);
        assert_eq!(store.resolve_locale(1, None), Locale::EnUs);

        store.set(Scope::Member, 1, Locale::EnUs).unwrap();
        assert_eq!(store.resolve_locale(1, Some(100)), Locale::EnUs);
    }

    #[test]
    fn test_set_overwrites_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());

        store.set(Scope::Member, 7, Locale::IdId).unwrap();
        store.set(Scope::Member, 7, Locale::EnUs).unwrap();
        assert_eq!(store.get(Scope::Member, 7).unwrap(), Some(Locale::EnUs));

        assert!(store.clear(Scope::Member, 7).unwrap());
        assert!(!store.clear(Scope::Member, 7).unwrap());
        assert_eq!(store.get(Scope::Member, 7).unwrap(), None);
    }
}
