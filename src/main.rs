use poise::serenity_prelude as serenity;
use shiori::birthday::BirthdayDispatcher;
use shiori::providers::Providers;
use shiori::{autoembed, cache, commands, config::Config, db::Database, logging, Data};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const HTTP_TIMEOUT_SECS: u64 = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::setup_logging(&config.log_dir)?;
    let discord_token = config.discord_token.clone();

    let db = Database::open(&config.database_dir)?;
    let http_client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?;
    let providers = Arc::new(Providers::new(&config, http_client));

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(commands::on_error(error)),
            pre_command: commands::pre_command,
            post_command: commands::post_command,
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    if let serenity::FullEvent::Message { new_message } = event {
                        if let Err(e) = autoembed::handle_message(ctx, data, new_message).await {
                            error!("Auto-embed for message {} failed: {}", new_message.id, e);
                        }
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                let commands = &framework.options().commands;
                match config.dev_guild_id {
                    Some(guild) => {
                        poise::builtins::register_in_guild(ctx, commands, serenity::GuildId::new(guild))
                            .await?;
                        info!("Registered {} commands in guild {}", commands.len(), guild);
                    }
                    None => {
                        poise::builtins::register_globally(ctx, commands).await?;
                        info!("Registered {} commands globally", commands.len());
                    }
                }

                ctx.set_activity(Some(serenity::ActivityData::custom(&config.status_message)));

                tokio::spawn(cache::start_sweep_task(
                    providers.cache_targets(),
                    config.cache_sweep_interval,
                ));
                let dispatcher = BirthdayDispatcher::new(
                    db.birthdays.clone(),
                    ctx.http.clone(),
                    config.birthday_check_interval,
                );
                tokio::spawn(dispatcher.run());

                Ok(Data {
                    config,
                    providers,
                    db,
                    started_at: chrono::Utc::now(),
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}
