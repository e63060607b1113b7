use super::DatabaseError;
use std::fs;
use std::path::{Path, PathBuf};

/// Opt-in list for auto-embeds: one empty marker file per Discord user.
#[derive(Clone)]
pub struct AutoEmbedAllowlist {
    dir: PathBuf,
}

impl AutoEmbedAllowlist {
    pub fn new(database_dir: &Path) -> Self {
        Self {
            dir: database_dir.join("allowlist_autoembed"),
        }
    }

    fn marker(&self, discord_id: u64) -> PathBuf {
        self.dir.join(discord_id.to_string())
    }

    pub fn is_allowed(&self, discord_id: u64) -> bool {
        self.marker(discord_id).is_file()
    }

    pub fn allow(&self, discord_id: u64) -> Result<(), DatabaseError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.marker(discord_id), b"")?;
        Ok(())
    }

    pub fn disallow(&self, discord_id: u64) -> Result<(), DatabaseError> {
        match fs::remove_file(self.marker(discord_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let list = AutoEmbedAllowlist::new(dir.path());

        assert!(!list.is_allowed(9));
        list.allow(9).unwrap();
        assert!(list.is_allowed(9));
        assert!(dir.path().join("allowlist_autoembed/9").exists());

        list.disallow(9).unwrap();
        assert!(!list.is_allowed(9));
        list.disallow(9).unwrap();
    }
}
