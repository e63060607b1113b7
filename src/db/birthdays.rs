use super::tsv::{fmt_opt, parse_opt, parse_req, Row, TsvFile};
use super::DatabaseError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct BirthdayRecord {
    pub discord_id: u64,
    pub guild_id: u64,
    /// Channel that receives the greeting.
    pub channel_id: u64,
    pub month: u32,
    pub day: u32,
    pub year: Option<i32>,
    /// Offset from UTC in minutes, used to decide when the day starts.
    pub utc_offset_minutes: i32,
    pub last_greeted_year: Option<i32>,
}

impl BirthdayRecord {
    /// Validate the calendar date (29 February is allowed).
    pub fn validate(month: u32, day: u32, year: Option<i32>) -> Result<(), String> {
        let check_year = year.unwrap_or(2000);
        if NaiveDate::from_ymd_opt(check_year, month, day).is_none() {
            return Err(format!("{:02}-{:02} is not a valid date", month, day));
        }
        Ok(())
    }

    pub fn local_now(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::minutes(self.utc_offset_minutes as i64)
    }

    /// Whether `date` is this record's birthday. Leap-day birthdays fall on
    /// 28 February in common years.
    pub fn falls_on(&self, date: NaiveDate) -> bool {
        if self.month == 2 && self.day == 29 && !is_leap_year(date.year()) {
            return date.month() == 2 && date.day() == 28;
        }
        date.month() == self.month && date.day() == self.day
    }

    pub fn age_on(&self, date: NaiveDate) -> Option<i32> {
        self.year.map(|y| date.year() - y)
    }
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

impl Row for BirthdayRecord {
    const COLUMNS: &'static [&'static str] = &[
        "discordId",
        "guildId",
        "channelId",
        "month",
        "day",
        "year",
        "utcOffsetMinutes",
        "lastGreetedYear",
    ];

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.discord_id.to_string(),
            self.guild_id.to_string(),
            self.channel_id.to_string(),
            self.month.to_string(),
            self.day.to_string(),
            fmt_opt(&self.year),
            self.utc_offset_minutes.to_string(),
            fmt_opt(&self.last_greeted_year),
        ]
    }

    fn from_fields(f: &[String]) -> Result<Self, String> {
        Ok(Self {
            discord_id: parse_req(&f[0], "discordId")?,
            guild_id: parse_req(&f[1], "guildId")?,
            channel_id: parse_req(&f[2], "channelId")?,
            month: parse_req(&f[3], "month")?,
            day: parse_req(&f[4], "day")?,
            year: parse_opt(&f[5], "year")?,
            utc_offset_minutes: parse_opt(&f[6], "utcOffsetMinutes")?.unwrap_or_default(),
            last_greeted_year: parse_opt(&f[7], "lastGreetedYear")?,
        })
    }
}

/// Birthdays keyed by `(discord_id, guild_id)`, stored in `birthday.csv`.
#[derive(Clone)]
pub struct BirthdayStore {
    file: TsvFile<BirthdayRecord>,
    lock: Arc<Mutex<()>>,
}

impl BirthdayStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: TsvFile::new(path),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn get(&self, discord_id: u64, guild_id: u64) -> Result<Option<BirthdayRecord>, DatabaseError> {
        let _guard = self.lock.lock().unwrap();
        Ok(self
            .file
            .load()?
            .into_iter()
            .find(|b| b.discord_id == discord_id && b.guild_id == guild_id))
    }

    /// Insert or replace. Replacing resets the greeted marker.
    pub fn set(&self, record: BirthdayRecord) -> Result<(), DatabaseError> {
        let _guard = self.lock.lock().unwrap();
        let mut rows = self.file.load()?;
        rows.retain(|b| !(b.discord_id == record.discord_id && b.guild_id == record.guild_id));
        rows.push(record);
        self.file.store(&rows)
    }

    pub fn remove(&self, discord_id: u64, guild_id: u64) -> Result<bool, DatabaseError> {
        let _guard = self.lock.lock().unwrap();
        let mut rows = self.file.load()?;
        let before = rows.len();
        rows.retain(|b| !(b.discord_id == discord_id && b.guild_id == guild_id));
        if rows.len() == before {
            return Ok(false);
        }
        self.file.store(&rows)?;
        Ok(true)
    }

    /// Records whose local date is their birthday and that have not been
    /// greeted in that local year.
    pub fn due(&self, now: DateTime<Utc>) -> Result<Vec<BirthdayRecord>, DatabaseError> {
        let _guard = self.lock.lock().unwrap();
        Ok(self
            .file
            .load()?
            .into_iter()
            .filter(|b| {
                let local = b.local_now(now).date_naive();
                b.falls_on(local) && b.last_greeted_year != Some(local.year())
            })
            .collect())
    }

    pub fn mark_greeted(&self, discord_id: u64, guild_id: u64, year: i32) -> Result<(), DatabaseError> {
        let _guard = self.lock.lock().unwrap();
        let mut rows = self.file.load()?;
        if let Some(row) = rows
            .iter_mut()
            .find(|b| b.discord_id == discord_id && b.guild_id == guild_id)
        {
            row.last_greeted_year = Some(year);
        }
        self.file.store(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn birthday(month: u32, day: u32, offset: i32) -> BirthdayRecord {
        BirthdayRecord {
            discord_id: 1,
            guild_id: 2,
            channel_id: 3,
            month,
            day,
            year: Some(2000),
            utc_offset_minutes: offset,
            last_greeted_year: None,
        }
    }

    #[test]
    fn test_validate() {
        assert!(BirthdayRecord::validate(2, 29, None).is_ok());
        assert!(BirthdayRecord::validate(2, 29, Some(2001)).is_err());
        assert!(BirthdayRecord::validate(13, 1, None).is_err());
    }

    #[test]
    fn test_leap_day_on_common_year() {
        let b = birthday(2, 29, 0);
        assert!(b.falls_on(NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()));
        assert!(!b.falls_on(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap()));
        assert!(b.falls_on(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
    }

    #[test]
    fn test_due_respects_offset_and_greeted_year() {
        let dir = tempfile::tempdir().unwrap();
        let store = BirthdayStore::new(dir.path().join("birthday.csv"));
        // UTC+7: 17:30 UTC on 9 March is already 10 March locally
        store.set(birthday(3, 10, 7 * 60)).unwrap();

        let now = Utc.with_ymd_and_hms(2025, 3, 9, 17, 30, 0).unwrap();
        let due = store.due(now).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].age_on(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()), Some(25));

        store.mark_greeted(1, 2, 2025).unwrap();
        assert!(store.due(now).unwrap().is_empty());

        let earlier = Utc.with_ymd_and_hms(2025, 3, 9, 16, 0, 0).unwrap();
        assert!(store.due(earlier).unwrap().is_empty());
    }

    #[test]
    fn test_set_replaces_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = BirthdayStore::new(dir.path().join("birthday.csv"));
        store.set(birthday(1, 1, 0)).unwrap();
        store.set(birthday(5, 5, 0)).unwrap();

        let stored = store.get(1, 2).unwrap().unwrap();
        assert_eq!((stored.month, stored.day), (5, 5));

        assert!(store.remove(1, 2).unwrap());
        assert!(!store.remove(1, 2).unwrap());
        assert!(store.get(1, 2).unwrap().is_none());
    }
}
