use crate::db::{BirthdayRecord, BirthdayStore};
use chrono::{Datelike, Utc};
use serenity::all::{ChannelId, CreateAllowedMentions, CreateMessage, UserId};
use serenity::http::Http;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info};

pub struct BirthdayDispatcher {
    store: BirthdayStore,
    http: Arc<Http>,
    poll_interval: Duration,
}

impl BirthdayDispatcher {
    pub fn new(store: BirthdayStore, http: Arc<Http>, poll_interval: Duration) -> Self {
        Self {
            store,
            http,
            poll_interval,
        }
    }

    pub async fn run(self) {
        info!(
            "Birthday dispatcher started (every {})",
            humantime::format_duration(self.poll_interval)
        );
        let mut ticker = interval(self.poll_interval);
        loop {
            ticker.tick().await;
            if let Err(e) = self.dispatch_due().await {
                error!("Birthday dispatch cycle failed: {}", e);
            }
        }
    }

    async fn dispatch_due(&self) -> anyhow::Result<()> {
        let now = Utc::now();
        let due = self.store.due(now)?;
        if due.is_empty() {
            return Ok(());
        }

        for record in due {
            let local_year = record.local_now(now).year();
            match self.send_greeting(&record).await {
                Ok(()) => {
                    if let Err(e) =
                        self.store
                            .mark_greeted(record.discord_id, record.guild_id, local_year)
                    {
                        error!(
                            "Failed to mark birthday of {} in guild {} greeted: {}",
                            record.discord_id, record.guild_id, e
                        );
                    }
                }
                Err(e) => {
                    error!(
                        "Failed to greet {} in channel {}: {}",
                        record.discord_id, record.channel_id, e
                    );
                }
            }
        }

        Ok(())
    }

    async fn send_greeting(&self, record: &BirthdayRecord) -> anyhow::Result<()> {
        let today = record.local_now(Utc::now()).date_naive();
        let content = greeting(record, today);

        let allowed_mentions =
            CreateAllowedMentions::new().users(vec![UserId::new(record.discord_id)]);
        let builder = CreateMessage::new()
            .content(content)
            .allowed_mentions(allowed_mentions);

        debug!(
            "Sending birthday greeting for {} to channel {}",
            record.discord_id, record.channel_id
        );

        ChannelId::new(record.channel_id)
            .send_message(&self.http, builder)
            .await?;

        Ok(())
    }
}

fn greeting(record: &BirthdayRecord, today: chrono::NaiveDate) -> String {
    match record.age_on(today).filter(|age| *age > 0) {
        Some(age) => format!(
            "🎂 Happy birthday, <@{}>! Congratulations on turning **{}**!",
            record.discord_id, age
        ),
        None => format!("🎂 Happy birthday, <@{}>!", record.discord_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_greeting_with_and_without_age() {
        let mut record = BirthdayRecord {
            discord_id: 42,
            guild_id: 1,
            channel_id: 2,
            month: 4,
            day: 3,
            year: Some(1998),
            utc_offset_minutes: 0,
            last_greeted_year: None,
        };
        let today = NaiveDate::from_ymd_opt(2024, 4, 3).unwrap();
        assert!(greeting(&record, today).contains("**26**"));

        record.year = None;
        assert_eq!(greeting(&record, today), "🎂 Happy birthday, <@42>!");
    }
}
